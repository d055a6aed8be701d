use serde::{Deserialize, Serialize};

use super::adjustment_type::AdjustmentType;

/// One entry in a competitor's rating history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingAdjustment {
    pub adjustment_type: AdjustmentType,
    /// None for season-boundary adjustments
    pub event_id: Option<i32>,
    pub season: i32,
    pub rating_before: f64,
    pub rating_after: f64,
    pub deviation_before: Option<f64>,
    pub deviation_after: Option<f64>
}

impl RatingAdjustment {
    pub fn rating_delta(&self) -> f64 {
        self.rating_after - self.rating_before
    }
}
