use indexmap::IndexMap;

use crate::model::{
    config::EloConfig,
    constants::ELO_SCALE,
    structures::{
        matchup::{Matchup, Outcome},
        rating::EloRating,
        DriverId
    }
};

/// Driver state before and after one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EloUpdate {
    pub before: EloRating,
    pub after: EloRating,
    pub matchups: u32
}

#[derive(Debug, Clone, Default)]
pub struct EloEngine {
    config: EloConfig
}

impl EloEngine {
    pub fn new(config: EloConfig) -> EloEngine {
        EloEngine { config }
    }

    pub fn initial_rating(&self) -> EloRating {
        EloRating::new(self.config.initial_rating)
    }

    /// Elite drivers keep the smallest K for good. Everyone else moves from
    /// the rookie K to the established K after enough applied matchups.
    pub fn k_factor(&self, state: &EloRating) -> f64 {
        if state.ever_elite {
            self.config.k_elite
        } else if state.races < self.config.rookie_races {
            self.config.k_rookie
        } else {
            self.config.k_established
        }
    }

    /// Probability that a competitor rated `rating` beats one rated `opponent`.
    pub fn expected_score(rating: f64, opponent: f64) -> f64 {
        1.0 / (1.0 + 10f64.powf((opponent - rating) / ELO_SCALE))
    }

    fn delta(&self, state: &EloRating, opponent: &EloRating, score: f64) -> f64 {
        self.k_factor(state) * (score - Self::expected_score(state.rating, opponent.rating))
    }

    fn finalize(&self, before: &EloRating, delta: f64, matchups: u32) -> EloRating {
        let rating = (before.rating + delta).clamp(self.config.rating_floor, self.config.rating_ceiling);
        EloRating {
            rating,
            races: before.races + matchups,
            ever_elite: before.ever_elite || rating >= self.config.elite_threshold
        }
    }

    /// Rates a single matchup in isolation. Each side uses its own K-factor.
    pub fn apply_matchup(&self, a: &EloRating, b: &EloRating, outcome: Outcome) -> (EloRating, EloRating) {
        let delta_a = self.delta(a, b, outcome.score_a());
        let delta_b = self.delta(b, a, outcome.score_b());

        (self.finalize(a, delta_a, 1), self.finalize(b, delta_b, 1))
    }

    /// # Event batch
    ///
    /// Every non-excluded matchup is rated against the state produced by
    /// `current`, which must reflect the ratings before this event. Deltas are
    /// summed per driver and applied once, so the order of `matchups` does not
    /// change the result. Excluded matchups are skipped entirely.
    pub fn rate_event<F>(&self, matchups: &[Matchup], current: F) -> IndexMap<DriverId, EloUpdate>
    where
        F: Fn(DriverId) -> EloRating
    {
        let mut pending: IndexMap<DriverId, (EloRating, f64, u32)> = IndexMap::new();

        for matchup in matchups.iter().filter(|m| !m.is_excluded()) {
            let a = pending.entry(matchup.a).or_insert_with(|| (current(matchup.a), 0.0, 0)).0;
            let b = pending.entry(matchup.b).or_insert_with(|| (current(matchup.b), 0.0, 0)).0;

            let delta_a = self.delta(&a, &b, matchup.outcome.score_a());
            let delta_b = self.delta(&b, &a, matchup.outcome.score_b());

            if let Some(entry) = pending.get_mut(&matchup.a) {
                entry.1 += delta_a;
                entry.2 += 1;
            }
            if let Some(entry) = pending.get_mut(&matchup.b) {
                entry.1 += delta_b;
                entry.2 += 1;
            }
        }

        pending
            .into_iter()
            .map(|(id, (before, delta, matchups))| {
                let update = EloUpdate {
                    before,
                    after: self.finalize(&before, delta, matchups),
                    matchups
                };
                (id, update)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::constants::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn engine() -> EloEngine {
        EloEngine::new(EloConfig::default())
    }

    fn state(rating: f64, races: u32, ever_elite: bool) -> EloRating {
        EloRating {
            rating,
            races,
            ever_elite
        }
    }

    #[test]
    fn test_k_factor_tiers() {
        let engine = engine();

        assert_abs_diff_eq!(engine.k_factor(&state(1500.0, 0, false)), K_ROOKIE);
        assert_abs_diff_eq!(engine.k_factor(&state(1500.0, 29, false)), K_ROOKIE);
        assert_abs_diff_eq!(engine.k_factor(&state(1500.0, 30, false)), K_ESTABLISHED);
        assert_abs_diff_eq!(engine.k_factor(&state(1500.0, 5, true)), K_ELITE);
        // The elite flag is permanent even after dropping below the threshold
        assert_abs_diff_eq!(engine.k_factor(&state(1600.0, 200, true)), K_ELITE);
    }

    #[test]
    fn test_expected_score() {
        assert_abs_diff_eq!(EloEngine::expected_score(1500.0, 1500.0), 0.5);
        assert_abs_diff_eq!(EloEngine::expected_score(1900.0, 1500.0), 10.0 / 11.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            EloEngine::expected_score(1620.0, 1480.0) + EloEngine::expected_score(1480.0, 1620.0),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_fresh_teammates() {
        let (a, b) = engine().apply_matchup(&state(1500.0, 0, false), &state(1500.0, 0, false), Outcome::AWins);

        assert_abs_diff_eq!(a.rating, 1520.0);
        assert_abs_diff_eq!(b.rating, 1480.0);
        assert_eq!(a.races, 1);
        assert_eq!(b.races, 1);
    }

    #[test]
    fn test_draw_between_equals_changes_nothing() {
        let (a, b) = engine().apply_matchup(&state(1500.0, 3, false), &state(1500.0, 3, false), Outcome::Draw);

        assert_abs_diff_eq!(a.rating, 1500.0);
        assert_abs_diff_eq!(b.rating, 1500.0);
    }

    #[test]
    fn test_asymmetric_k_factors() {
        // Elite A (K=10) beats rookie B (K=40) at equal ratings
        let (a, b) = engine().apply_matchup(&state(1700.0, 100, true), &state(1700.0, 0, false), Outcome::AWins);

        assert_abs_diff_eq!(a.rating, 1705.0);
        assert_abs_diff_eq!(b.rating, 1680.0);
    }

    #[test]
    fn test_elite_flag_latches() {
        let (a, _) = engine().apply_matchup(&state(1745.0, 40, false), &state(1745.0, 40, false), Outcome::AWins);

        assert_abs_diff_eq!(a.rating, 1755.0);
        assert!(a.ever_elite);
    }

    #[test]
    fn test_rating_clamped() {
        let (_, b) = engine().apply_matchup(&state(2400.0, 0, false), &state(800.0, 0, false), Outcome::AWins);
        assert!(b.rating >= ELO_RATING_FLOOR);

        let (a, _) = engine().apply_matchup(&state(2399.0, 0, false), &state(2399.0, 0, false), Outcome::AWins);
        assert_abs_diff_eq!(a.rating, ELO_RATING_CEILING);
    }

    #[test]
    fn test_rate_event_uses_pre_event_ratings() {
        let engine = engine();
        // Three teammates: 1 beats 2, 1 beats 3, 2 beats 3
        let matchups = vec![
            Matchup::decided(1, 2, Outcome::AWins),
            Matchup::decided(1, 3, Outcome::AWins),
            Matchup::decided(2, 3, Outcome::AWins),
        ];

        let updates = engine.rate_event(&matchups, |_| engine.initial_rating());

        assert_abs_diff_eq!(updates[&1].after.rating, 1540.0);
        assert_abs_diff_eq!(updates[&2].after.rating, 1500.0);
        assert_abs_diff_eq!(updates[&3].after.rating, 1460.0);
        assert_eq!(updates[&1].matchups, 2);
        assert_eq!(updates[&3].after.races, 2);
    }

    #[test]
    fn test_rate_event_skips_excluded() {
        let engine = engine();
        let matchups = vec![Matchup::excluded(
            1,
            2,
            crate::model::structures::matchup::ExclusionReason::MechanicalFailure
        )];

        let updates = engine.rate_event(&matchups, |_| engine.initial_rating());

        assert!(updates.is_empty());
    }

    proptest! {
        #[test]
        fn prop_equal_k_is_zero_sum(
            ra in 900.0f64..2300.0,
            rb in 900.0f64..2300.0,
            races in 0u32..100,
            outcome in prop_oneof![Just(Outcome::AWins), Just(Outcome::BWins), Just(Outcome::Draw)]
        ) {
            let engine = engine();
            let (a, b) = engine.apply_matchup(&state(ra, races, false), &state(rb, races, false), outcome);

            prop_assert!((a.rating + b.rating - ra - rb).abs() < 1e-9);
        }

        #[test]
        fn prop_batch_independent_of_order(
            outcomes in proptest::collection::vec(0u8..3, 3)
        ) {
            let engine = engine();
            let to_outcome = |o: u8| match o {
                0 => Outcome::AWins,
                1 => Outcome::BWins,
                _ => Outcome::Draw
            };
            let pairs = [(1, 2), (1, 3), (2, 3)];
            let forward: Vec<Matchup> = pairs
                .iter()
                .zip(outcomes.iter())
                .map(|(&(a, b), &o)| Matchup::decided(a, b, to_outcome(o)))
                .collect();
            let mut backward = forward.clone();
            backward.reverse();

            let x = engine.rate_event(&forward, |_| engine.initial_rating());
            let y = engine.rate_event(&backward, |_| engine.initial_rating());

            for id in 1..=3 {
                prop_assert!((x[&id].after.rating - y[&id].after.rating).abs() < 1e-9);
            }
        }
    }
}
