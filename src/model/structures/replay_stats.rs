use serde::{Deserialize, Serialize};

use super::session_type::SessionType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounts {
    pub qualifying: u32,
    pub race: u32
}

impl SessionCounts {
    pub fn add(&mut self, session: SessionType, n: u32) {
        match session {
            SessionType::Qualifying => self.qualifying += n,
            SessionType::Race => self.race += n
        }
    }

    pub fn get(&self, session: SessionType) -> u32 {
        match session {
            SessionType::Qualifying => self.qualifying,
            SessionType::Race => self.race
        }
    }

    pub fn total(&self) -> u32 {
        self.qualifying + self.race
    }

    pub fn merge(&mut self, other: &SessionCounts) {
        self.qualifying += other.qualifying;
        self.race += other.race;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupCounts {
    pub drivers: SessionCounts,
    pub lineages: SessionCounts
}

impl MatchupCounts {
    pub fn merge(&mut self, other: &MatchupCounts) {
        self.drivers.merge(&other.drivers);
        self.lineages.merge(&other.lineages);
    }
}

/// Shift applied to one rating pool when a season closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolShift {
    pub session: SessionType,
    pub pool_size: usize,
    pub mean_before: f64,
    pub shift: f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub season: i32,
    pub drivers: Vec<PoolShift>,
    pub lineages: Vec<PoolShift>
}

/// What one call to `process_event` did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub event_id: i32,
    pub applied: MatchupCounts,
    pub excluded: MatchupCounts,
    /// Lineages whose deviation grew because they had no opponent
    pub inactive_lineages: u32,
    /// Set when this event opened a new season and the previous one was normalized first
    pub closed_season: Option<NormalizationReport>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayStats {
    pub events: u32,
    pub seasons_closed: u32,
    pub applied: MatchupCounts,
    pub excluded: MatchupCounts
}

impl ReplayStats {
    pub fn record(&mut self, summary: &EventSummary) {
        self.events += 1;
        self.applied.merge(&summary.applied);
        self.excluded.merge(&summary.excluded);
    }
}
