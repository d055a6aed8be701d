use serde::{Deserialize, Serialize};

/// Access to the scalar rating of a state so pools can be shifted uniformly.
pub trait Rated {
    fn rating(&self) -> f64;
    fn set_rating(&mut self, rating: f64);

    fn deviation(&self) -> Option<f64> {
        None
    }
}

/// Per-driver, per-session Elo state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloRating {
    pub rating: f64,
    /// Count of applied matchups; drives the K-factor tier.
    pub races: u32,
    /// Latched once the rating reaches the elite threshold.
    pub ever_elite: bool
}

impl EloRating {
    pub fn new(rating: f64) -> EloRating {
        EloRating {
            rating,
            races: 0,
            ever_elite: false
        }
    }
}

impl Rated for EloRating {
    fn rating(&self) -> f64 {
        self.rating
    }

    fn set_rating(&mut self, rating: f64) {
        self.rating = rating;
    }
}

/// Per-lineage, per-session Glicko-2 state on the display scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlickoRating {
    pub rating: f64,
    pub deviation: f64,
    pub volatility: f64,
    /// Rating periods (events) in which this lineage had at least one opponent.
    pub races: u32,
    pub matchups: u32
}

impl GlickoRating {
    pub fn new(rating: f64, deviation: f64, volatility: f64) -> GlickoRating {
        GlickoRating {
            rating,
            deviation,
            volatility,
            races: 0,
            matchups: 0
        }
    }
}

impl Rated for GlickoRating {
    fn rating(&self) -> f64 {
        self.rating
    }

    fn set_rating(&mut self, rating: f64) {
        self.rating = rating;
    }

    fn deviation(&self) -> Option<f64> {
        Some(self.deviation)
    }
}
