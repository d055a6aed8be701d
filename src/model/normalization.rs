use std::collections::HashSet;

use tracing::debug;

use crate::model::{
    config::NormalizationConfig,
    rating_store::RatingStore,
    structures::{rating::Rated, replay_stats::PoolShift, session_type::SessionType}
};

/// Re-centres rating pools at season boundaries.
#[derive(Debug, Clone, Default)]
pub struct SeasonNormalizer {
    config: NormalizationConfig
}

impl SeasonNormalizer {
    pub fn new(config: NormalizationConfig) -> SeasonNormalizer {
        SeasonNormalizer { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// The shift that moves the mean of `pool` onto the baseline, or `None` when
    /// the pool is too small to normalize. Returns `(pool size, mean, shift)`.
    pub fn shift_for(&self, pool: &[f64]) -> Option<(usize, f64, f64)> {
        if pool.len() < self.config.min_active_pool {
            return None;
        }

        let mean = pool.iter().sum::<f64>() / pool.len() as f64;
        Some((pool.len(), mean, self.config.baseline - mean))
    }

    /// # Season normalization
    ///
    /// The mean is taken over `active` (competitors rated in the closing season),
    /// but the resulting shift is applied to every competitor of `session` in the
    /// store so relative distances across the whole pool are preserved.
    /// Ratings are clamped to `bounds` afterwards.
    pub fn normalize<S: Rated + Clone>(
        &self,
        store: &mut RatingStore<S>,
        active: &HashSet<i32>,
        session: SessionType,
        bounds: (f64, f64),
        season: i32
    ) -> Option<PoolShift> {
        let mut ids: Vec<i32> = active.iter().copied().collect();
        ids.sort_unstable();
        let pool: Vec<f64> = ids
            .iter()
            .filter_map(|id| store.get(*id, session).map(|s| s.rating()))
            .collect();

        let (pool_size, mean_before, shift) = self.shift_for(&pool)?;
        let touched = store.shift_session(session, shift, bounds, season);

        debug!(season, %session, pool_size, mean_before, shift, touched, "Normalized rating pool");

        Some(PoolShift {
            session,
            pool_size,
            mean_before,
            shift
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::structures::rating::EloRating;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_shift_for() {
        let normalizer = SeasonNormalizer::default();

        let (size, mean, shift) = normalizer.shift_for(&[1520.0, 1540.0]).unwrap();
        assert_eq!(size, 2);
        assert_abs_diff_eq!(mean, 1530.0);
        assert_abs_diff_eq!(shift, -30.0);

        assert!(normalizer.shift_for(&[1700.0]).is_none());
        assert!(normalizer.shift_for(&[]).is_none());
    }

    #[test]
    fn test_centred_pool_gets_zero_shift() {
        let normalizer = SeasonNormalizer::default();

        let (_, mean, shift) = normalizer.shift_for(&[1450.0, 1550.0]).unwrap();
        assert_abs_diff_eq!(mean, 1500.0);
        assert_abs_diff_eq!(shift, 0.0);

        // Normalizing twice moves nothing the second time
        let mut store: RatingStore<EloRating> = RatingStore::default();
        store.upsert(1, SessionType::Race, EloRating::new(1530.0));
        store.upsert(2, SessionType::Race, EloRating::new(1610.0));
        let active: HashSet<i32> = [1, 2].into_iter().collect();
        let first = normalizer
            .normalize(&mut store, &active, SessionType::Race, (800.0, 2400.0), 2005)
            .unwrap();
        assert_abs_diff_eq!(first.shift, -70.0);

        let second = normalizer
            .normalize(&mut store, &active, SessionType::Race, (800.0, 2400.0), 2005)
            .unwrap();
        assert_abs_diff_eq!(second.shift, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(store.get(1, SessionType::Race).unwrap().rating, 1460.0, epsilon = 1e-9);
    }

    #[test]
    fn test_normalize_moves_active_mean_to_baseline() {
        let mut store: RatingStore<EloRating> = RatingStore::default();
        store.upsert(1, SessionType::Race, EloRating::new(1560.0));
        store.upsert(2, SessionType::Race, EloRating::new(1480.0));
        store.upsert(3, SessionType::Race, EloRating::new(1600.0));
        // Driver 3 did not race this season but still receives the shift
        let active: HashSet<i32> = [1, 2].into_iter().collect();

        let shift = SeasonNormalizer::default()
            .normalize(&mut store, &active, SessionType::Race, (800.0, 2400.0), 2005)
            .unwrap();

        assert_abs_diff_eq!(shift.shift, -20.0);
        assert_abs_diff_eq!(store.get(1, SessionType::Race).unwrap().rating, 1540.0);
        assert_abs_diff_eq!(store.get(2, SessionType::Race).unwrap().rating, 1460.0);
        assert_abs_diff_eq!(store.get(3, SessionType::Race).unwrap().rating, 1580.0);

        let mean = (store.get(1, SessionType::Race).unwrap().rating + store.get(2, SessionType::Race).unwrap().rating)
            / 2.0;
        assert_abs_diff_eq!(mean, 1500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_small_pool_left_alone() {
        let mut store: RatingStore<EloRating> = RatingStore::default();
        store.upsert(1, SessionType::Race, EloRating::new(1560.0));
        let active: HashSet<i32> = [1].into_iter().collect();

        let shift = SeasonNormalizer::default().normalize(&mut store, &active, SessionType::Race, (800.0, 2400.0), 2005);

        assert!(shift.is_none());
        assert_abs_diff_eq!(store.get(1, SessionType::Race).unwrap().rating, 1560.0);
    }
}
