use std::collections::HashMap;

use crate::model::{
    config::{EraBand, ExportConfig, ReliabilityCurve},
    rating_store::RatingStore,
    structures::{
        rating::{EloRating, GlickoRating},
        session_type::SessionType,
        snapshot::{DriverSnapshot, LineageSnapshot},
        DriverId, LineageId
    }
};

/// Logistic reliability score in [0, 100].
pub fn reliability(matchups: u32, curve: &ReliabilityCurve) -> f64 {
    100.0 / (1.0 + (-(matchups as f64 - curve.center) / curve.width).exp())
}

/// Multiplier of the first band whose year lies after `first_year`; 1.0 otherwise.
pub fn era_multiplier(first_year: i32, bands: &[EraBand]) -> f64 {
    bands
        .iter()
        .find(|band| first_year < band.before_year)
        .map_or(1.0, |band| band.multiplier)
}

pub fn sample_penalty(matchups: u32, threshold: u32, penalty: f64) -> f64 {
    if matchups < threshold {
        penalty
    } else {
        1.0
    }
}

pub struct Exporter<'a> {
    config: &'a ExportConfig
}

impl<'a> Exporter<'a> {
    pub fn new(config: &'a ExportConfig) -> Exporter<'a> {
        Exporter { config }
    }

    pub fn global_rating(&self, qualifying: f64, race: f64) -> f64 {
        self.config.qualifying_weight * qualifying + self.config.race_weight * race
    }

    /// Weighted sum of each session's rating minus its deviations.
    pub fn conservative_rating(&self, qualifying: &GlickoRating, race: &GlickoRating) -> f64 {
        let k = self.config.conservative_deviations;
        self.global_rating(
            qualifying.rating - k * qualifying.deviation,
            race.rating - k * race.deviation
        )
    }

    fn era_adjusted(&self, global: f64, first_year: Option<i32>, matchups: u32, threshold: u32) -> f64 {
        let year = first_year.unwrap_or(self.config.default_first_year);
        global
            * era_multiplier(year, &self.config.era_bands)
            * sample_penalty(matchups, threshold, self.config.sample_penalty)
    }

    /// # Driver leaderboard
    ///
    /// One row per driver with any state. A session the driver never took part
    /// in reports `initial`. Rows are ordered by global rating, highest first,
    /// ties broken by id, and ranked from 1.
    pub fn driver_snapshots(
        &self,
        store: &RatingStore<EloRating>,
        initial: &EloRating,
        names: &HashMap<DriverId, String>
    ) -> Vec<DriverSnapshot> {
        let rows: Vec<DriverSnapshot> = store
            .competitors()
            .into_iter()
            .map(|id| {
                let qualifying = store.get(id, SessionType::Qualifying).unwrap_or(initial);
                let race = store.get(id, SessionType::Race).unwrap_or(initial);
                let total = qualifying.races + race.races;
                let global = self.global_rating(qualifying.rating, race.rating);
                let activity = store.activity(id);
                let first_active_year = activity.map(|a| a.first_season);

                DriverSnapshot {
                    rank: 0,
                    driver_id: id,
                    name: names.get(&id).cloned(),
                    qualifying_rating: qualifying.rating,
                    race_rating: race.rating,
                    global_rating: global,
                    era_adjusted_rating: self.era_adjusted(
                        global,
                        first_active_year,
                        total,
                        self.config.driver_sample_threshold
                    ),
                    qualifying_matchups: qualifying.races,
                    race_matchups: race.races,
                    total_matchups: total,
                    reliability: reliability(total, &self.config.driver_reliability),
                    ever_elite: qualifying.ever_elite || race.ever_elite,
                    first_active_year,
                    last_active_year: activity.map(|a| a.last_season)
                }
            })
            .collect();

        rank(rows, |r| (r.global_rating, r.driver_id), |r, n| r.rank = n)
    }

    /// Lineage rows, ordered and ranked like [`Exporter::driver_snapshots`].
    pub fn lineage_snapshots(
        &self,
        store: &RatingStore<GlickoRating>,
        initial: &GlickoRating,
        names: &HashMap<LineageId, String>
    ) -> Vec<LineageSnapshot> {
        let rows: Vec<LineageSnapshot> = store
            .competitors()
            .into_iter()
            .map(|id| {
                let qualifying = store.get(id, SessionType::Qualifying).unwrap_or(initial);
                let race = store.get(id, SessionType::Race).unwrap_or(initial);
                let total = qualifying.matchups + race.matchups;
                let global = self.global_rating(qualifying.rating, race.rating);
                let activity = store.activity(id);
                let first_active_year = activity.map(|a| a.first_season);

                LineageSnapshot {
                    rank: 0,
                    lineage_id: id,
                    name: names.get(&id).cloned(),
                    qualifying_rating: qualifying.rating,
                    qualifying_deviation: qualifying.deviation,
                    qualifying_volatility: qualifying.volatility,
                    race_rating: race.rating,
                    race_deviation: race.deviation,
                    race_volatility: race.volatility,
                    global_rating: global,
                    conservative_rating: self.conservative_rating(qualifying, race),
                    era_adjusted_rating: self.era_adjusted(
                        global,
                        first_active_year,
                        total,
                        self.config.lineage_sample_threshold
                    ),
                    qualifying_matchups: qualifying.matchups,
                    race_matchups: race.matchups,
                    total_matchups: total,
                    reliability: reliability(total, &self.config.lineage_reliability),
                    first_active_year,
                    last_active_year: activity.map(|a| a.last_season)
                }
            })
            .collect();

        rank(rows, |r| (r.global_rating, r.lineage_id), |r, n| r.rank = n)
    }
}

fn rank<T>(mut rows: Vec<T>, key: impl Fn(&T) -> (f64, i32), mut set_rank: impl FnMut(&mut T, u32)) -> Vec<T> {
    rows.sort_by(|a, b| {
        let (ra, ia) = key(a);
        let (rb, ib) = key(b);
        rb.total_cmp(&ra).then(ia.cmp(&ib))
    });

    for (i, row) in rows.iter_mut().enumerate() {
        set_rank(row, i as u32 + 1);
    }

    rows
}
