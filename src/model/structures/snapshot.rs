use serde::{Deserialize, Serialize};

use super::{replay_stats::ReplayStats, DriverId, LineageId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSnapshot {
    /// 1-based position when ordered by global rating
    pub rank: u32,
    pub driver_id: DriverId,
    pub name: Option<String>,
    pub qualifying_rating: f64,
    pub race_rating: f64,
    pub global_rating: f64,
    pub era_adjusted_rating: f64,
    pub qualifying_matchups: u32,
    pub race_matchups: u32,
    pub total_matchups: u32,
    pub reliability: f64,
    pub ever_elite: bool,
    pub first_active_year: Option<i32>,
    pub last_active_year: Option<i32>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageSnapshot {
    pub rank: u32,
    pub lineage_id: LineageId,
    pub name: Option<String>,
    pub qualifying_rating: f64,
    pub qualifying_deviation: f64,
    pub qualifying_volatility: f64,
    pub race_rating: f64,
    pub race_deviation: f64,
    pub race_volatility: f64,
    pub global_rating: f64,
    /// Weighted sum of each session's rating minus two deviations
    pub conservative_rating: f64,
    pub era_adjusted_rating: f64,
    pub qualifying_matchups: u32,
    pub race_matchups: u32,
    pub total_matchups: u32,
    pub reliability: f64,
    pub first_active_year: Option<i32>,
    pub last_active_year: Option<i32>
}

/// Everything a sink receives after a replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotExport {
    pub keyword_table_version: u32,
    pub stats: ReplayStats,
    pub drivers: Vec<DriverSnapshot>,
    pub lineages: Vec<LineageSnapshot>
}
