use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::structures::{
    adjustment_type::AdjustmentType, rating::Rated, rating_adjustment::RatingAdjustment,
    session_type::SessionType
};

/// Seasons and events a competitor took part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub first_season: i32,
    pub last_season: i32,
    pub events: u32,
    pub last_event_id: i32
}

/// Where a rating change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustmentContext {
    pub adjustment_type: AdjustmentType,
    pub event_id: Option<i32>,
    pub season: i32
}

pub struct RatingStore<S> {
    // Keyed by (competitor id, session). Insertion order is first-appearance order,
    // which keeps iteration deterministic.
    ratings: IndexMap<(i32, SessionType), S>,
    adjustments: HashMap<(i32, SessionType), Vec<RatingAdjustment>>,
    activity: IndexMap<i32, Activity>,
    track_adjustments: bool
}

impl<S: Rated + Clone> Default for RatingStore<S> {
    fn default() -> Self {
        Self::new(true)
    }
}

impl<S: Rated + Clone> RatingStore<S> {
    pub fn new(track_adjustments: bool) -> RatingStore<S> {
        RatingStore {
            ratings: IndexMap::new(),
            adjustments: HashMap::new(),
            activity: IndexMap::new(),
            track_adjustments
        }
    }

    pub fn get(&self, id: i32, session: SessionType) -> Option<&S> {
        self.ratings.get(&(id, session))
    }

    /// Returns the stored state, inserting `init()` first if the competitor is new.
    pub fn get_or_insert_with<F: FnOnce() -> S>(&mut self, id: i32, session: SessionType, init: F) -> &S {
        self.ratings.entry((id, session)).or_insert_with(init)
    }

    /// Replaces a state without recording history.
    pub fn upsert(&mut self, id: i32, session: SessionType, state: S) {
        self.ratings.insert((id, session), state);
    }

    /// Stores `after` and, when history is tracked, records the change from
    /// `before`. A competitor seen for the first time also gets an initial entry.
    pub fn commit(&mut self, id: i32, session: SessionType, before: &S, after: S, context: AdjustmentContext) {
        if self.track_adjustments {
            let history = self.adjustments.entry((id, session)).or_default();
            if history.is_empty() {
                history.push(Self::adjustment(
                    before,
                    before,
                    AdjustmentContext {
                        adjustment_type: AdjustmentType::Initial,
                        ..context
                    }
                ));
            }
            history.push(Self::adjustment(before, &after, context));
        }

        self.ratings.insert((id, session), after);
    }

    fn adjustment(before: &S, after: &S, context: AdjustmentContext) -> RatingAdjustment {
        RatingAdjustment {
            adjustment_type: context.adjustment_type,
            event_id: context.event_id,
            season: context.season,
            rating_before: before.rating(),
            rating_after: after.rating(),
            deviation_before: before.deviation(),
            deviation_after: after.deviation()
        }
    }

    /// # Uniform shift
    ///
    /// Adds `delta` to every stored rating of `session`, clamping to `bounds`.
    /// Returns how many states were touched.
    pub fn shift_session(&mut self, session: SessionType, delta: f64, bounds: (f64, f64), season: i32) -> usize {
        let context = AdjustmentContext {
            adjustment_type: AdjustmentType::Normalization,
            event_id: None,
            season
        };

        let keys: Vec<i32> = self
            .ratings
            .keys()
            .filter(|(_, s)| *s == session)
            .map(|(id, _)| *id)
            .collect();

        for id in &keys {
            if let Some(before) = self.get(*id, session).cloned() {
                let mut after = before.clone();
                after.set_rating((before.rating() + delta).clamp(bounds.0, bounds.1));
                self.commit(*id, session, &before, after, context);
            }
        }

        keys.len()
    }

    pub fn record_activity(&mut self, id: i32, season: i32, event_id: i32) {
        let activity = self.activity.entry(id).or_insert(Activity {
            first_season: season,
            last_season: season,
            events: 0,
            last_event_id: event_id
        });

        if activity.events > 0 && activity.last_event_id == event_id {
            return;
        }

        activity.first_season = activity.first_season.min(season);
        activity.last_season = activity.last_season.max(season);
        activity.events += 1;
        activity.last_event_id = event_id;
    }

    pub fn activity(&self, id: i32) -> Option<&Activity> {
        self.activity.get(&id)
    }

    pub fn get_rating_adjustments(&self, id: i32, session: SessionType) -> Option<&Vec<RatingAdjustment>> {
        self.adjustments.get(&(id, session))
    }

    /// Every competitor with either a rating or recorded activity, in first-seen order.
    pub fn competitors(&self) -> Vec<i32> {
        let mut ids: IndexMap<i32, ()> = IndexMap::new();
        for (id, _) in self.ratings.keys() {
            ids.insert(*id, ());
        }
        for id in self.activity.keys() {
            ids.insert(*id, ());
        }

        ids.into_keys().collect()
    }

    /// Ids holding a state for `session`.
    pub fn rated_in(&self, session: SessionType) -> impl Iterator<Item = i32> + '_ {
        self.ratings
            .keys()
            .filter(move |(_, s)| *s == session)
            .map(|(id, _)| *id)
    }

    /// An owned copy of every state. Later mutation of the store does not affect it.
    pub fn snapshot_all(&self) -> Vec<((i32, SessionType), S)> {
        self.ratings.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}
