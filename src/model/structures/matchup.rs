use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    AWins,
    BWins,
    Draw
}

impl Outcome {
    /// `Greater` means side A performed better.
    pub fn from_ordering(ordering: Ordering) -> Outcome {
        match ordering {
            Ordering::Greater => Outcome::AWins,
            Ordering::Less => Outcome::BWins,
            Ordering::Equal => Outcome::Draw
        }
    }

    pub fn score_a(&self) -> f64 {
        match self {
            Outcome::AWins => 1.0,
            Outcome::BWins => 0.0,
            Outcome::Draw => 0.5
        }
    }

    pub fn score_b(&self) -> f64 {
        1.0 - self.score_a()
    }
}

/// Why a pairing was produced but must not touch any rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExclusionReason {
    MechanicalFailure,
    BothDriverError
}

/// A single head-to-head comparison between two competitors of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matchup {
    pub a: i32,
    pub b: i32,
    pub outcome: Outcome,
    pub exclusion: Option<ExclusionReason>
}

impl Matchup {
    pub fn decided(a: i32, b: i32, outcome: Outcome) -> Matchup {
        Matchup {
            a,
            b,
            outcome,
            exclusion: None
        }
    }

    /// Excluded matchups carry a draw so the outcome is never read as a result.
    pub fn excluded(a: i32, b: i32, reason: ExclusionReason) -> Matchup {
        Matchup {
            a,
            b,
            outcome: Outcome::Draw,
            exclusion: Some(reason)
        }
    }

    pub fn is_excluded(&self) -> bool {
        self.exclusion.is_some()
    }
}
