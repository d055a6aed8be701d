use std::cmp::Ordering;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::model::structures::{
    classification::Classification,
    event::SessionResult,
    matchup::{ExclusionReason, Outcome}
};

pub const KEYWORD_TABLE_VERSION: u32 = 1;

const MECHANICAL_KEYWORDS: &[&str] = &[
    "Engine",
    "Gearbox",
    "Transmission",
    "Clutch",
    "Hydraulics",
    "Electrical",
    "Electronics",
    "Fuel System",
    "Fuel Pump",
    "Fuel Pressure",
    "Oil Pressure",
    "Oil Leak",
    "Radiator",
    "Cooling System",
    "Water Leak",
    "Overheating",
    "Suspension",
    "Brakes",
    "Wheel",
    "Wheel Bearing",
    "Puncture",
    "Driveshaft",
    "CV Joint",
    "Differential",
    "Halfshaft",
    "Battery",
    "Alternator",
    "Turbo",
    "Throttle",
    "Fuel Leak",
    "Fire",
    "Power Unit",
    "ERS",
    "MGU-K",
    "MGU-H",
    "Pneumatics",
    "Exhaust",
    "Mechanical"
];

const DRIVER_ERROR_KEYWORDS: &[&str] = &[
    "Accident",
    "Collision",
    "Spun off",
    "Damage",
    "Collision damage",
    "Fatal accident",
    "Injury",
    "Driver Seat",
    "Seat"
];

lazy_static! {
    pub static ref DEFAULT_RULES: ClassificationRules = ClassificationRules::new(&KeywordTable::default());
}

/// Versioned keyword lists used to classify result statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTable {
    pub version: u32,
    pub mechanical: Vec<String>,
    pub driver_error: Vec<String>
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self {
            version: KEYWORD_TABLE_VERSION,
            mechanical: MECHANICAL_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            driver_error: DRIVER_ERROR_KEYWORDS.iter().map(|k| k.to_string()).collect()
        }
    }
}

/// A keyword table prepared for case-insensitive matching.
#[derive(Debug, Clone)]
pub struct ClassificationRules {
    version: u32,
    mechanical: Vec<String>,
    driver_error: Vec<String>
}

impl ClassificationRules {
    pub fn new(table: &KeywordTable) -> ClassificationRules {
        let lower = |keywords: &[String]| -> Vec<String> { keywords.iter().map(|k| k.trim().to_lowercase()).collect() };

        ClassificationRules {
            version: table.version,
            mechanical: lower(&table.mechanical),
            driver_error: lower(&table.driver_error)
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// # Classification
    ///
    /// - Missing or blank statuses are unclassified.
    /// - `Finished` and lapped statuses (`+1 Lap`, `+2 Laps`, ...) are finishes.
    /// - Otherwise the status is searched for mechanical keywords first, then
    ///   driver-error keywords, as case-insensitive substrings.
    pub fn classify(&self, status: Option<&str>) -> Classification {
        let status = match status.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return Classification::Unclassified
        };

        if status.eq_ignore_ascii_case("finished") || status.starts_with('+') {
            return Classification::Finished;
        }

        let lower = status.to_lowercase();
        if self.mechanical.iter().any(|k| lower.contains(k.as_str())) {
            Classification::MechanicalFailure
        } else if self.driver_error.iter().any(|k| lower.contains(k.as_str())) {
            Classification::DriverError
        } else {
            Classification::Unclassified
        }
    }

    /// The standing of a driver row for head-to-head purposes.
    pub fn standing(&self, result: &SessionResult) -> Standing<Option<i32>> {
        match self.classify(result.status()) {
            Classification::MechanicalFailure => Standing::Mechanical,
            Classification::DriverError => Standing::DriverError,
            Classification::Finished | Classification::Unclassified => Standing::Ranked(result.position())
        }
    }
}

impl Default for ClassificationRules {
    fn default() -> Self {
        DEFAULT_RULES.clone()
    }
}

/// Where one side of a head-to-head stands. `T` is whatever the sides are
/// compared on when neither is a non-finish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Standing<T> {
    Ranked(T),
    DriverError,
    Mechanical
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Decided(Outcome),
    Excluded(ExclusionReason)
}

/// # Head-to-head policy
///
/// Shared by driver and lineage pairing:
///
/// 1. A mechanical failure on either side excludes the matchup.
/// 2. Two driver errors exclude the matchup.
/// 3. A single driver error loses to the other side.
/// 4. Otherwise `compare` decides; `Ordering::Greater` means A performed better.
pub fn resolve<T>(a: &Standing<T>, b: &Standing<T>, compare: impl FnOnce(&T, &T) -> Ordering) -> Resolution {
    match (a, b) {
        (Standing::Mechanical, _) | (_, Standing::Mechanical) => {
            Resolution::Excluded(ExclusionReason::MechanicalFailure)
        }
        (Standing::DriverError, Standing::DriverError) => Resolution::Excluded(ExclusionReason::BothDriverError),
        (Standing::DriverError, _) => Resolution::Decided(Outcome::BWins),
        (_, Standing::DriverError) => Resolution::Decided(Outcome::AWins),
        (Standing::Ranked(x), Standing::Ranked(y)) => Resolution::Decided(Outcome::from_ordering(compare(x, y)))
    }
}

/// Lower finishing positions are better. A missing position ranks behind every
/// recorded one.
pub fn compare_positions(a: &Option<i32>, b: &Option<i32>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal
    }
}
