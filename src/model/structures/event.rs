use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{session_type::SessionType, ConstructorId, DriverId};

/// One driver's row in one session of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub session: SessionType,
    pub driver_id: DriverId,
    pub constructor_id: ConstructorId,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub status: Option<String>
}

impl SessionResult {
    /// Finishing position, treating zero and negative values as missing.
    pub fn position(&self) -> Option<i32> {
        self.position.filter(|p| *p > 0)
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i32,
    pub season: i32,
    pub round: i32,
    pub date: NaiveDate,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub results: Vec<SessionResult>
}

impl Event {
    pub fn key(&self) -> EventKey {
        EventKey {
            date: self.date,
            round: self.round
        }
    }

    pub fn session_results(&self, session: SessionType) -> impl Iterator<Item = &SessionResult> {
        self.results.iter().filter(move |r| r.session == session)
    }
}

/// Replay order of an event: date first, round as the tie-breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventKey {
    pub date: NaiveDate,
    pub round: i32
}

impl Display for EventKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (round {})", self.date, self.round)
    }
}

/// Stable sort into replay order. Events sharing a key keep their input order.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by_key(|e| e.key());
}
