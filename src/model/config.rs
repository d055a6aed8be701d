use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::ProcessorError,
    model::{classification::KeywordTable, constants::*}
};

/// Tunables for the whole replay. Every field falls back to its default when
/// missing from the TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub elo: EloConfig,
    pub glicko: Glicko2Config,
    pub skill: SkillAdjustmentConfig,
    pub normalization: NormalizationConfig,
    pub export: ExportConfig,
    /// Replaces the built-in status keyword table when present
    pub classification: Option<KeywordTable>,
    /// Keep a per-competitor history of every rating change
    pub track_adjustments: bool
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            elo: EloConfig::default(),
            glicko: Glicko2Config::default(),
            skill: SkillAdjustmentConfig::default(),
            normalization: NormalizationConfig::default(),
            export: ExportConfig::default(),
            classification: None,
            track_adjustments: true
        }
    }
}

impl EngineConfig {
    /// Reads and validates a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ProcessorError> {
        let contents = fs::read_to_string(path).map_err(|source| ProcessorError::Io {
            path: path.to_path_buf(),
            source
        })?;

        let config = Self::from_toml(&contents)?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ProcessorError> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ProcessorError> {
        self.elo.validate()?;
        self.glicko.validate()?;
        self.skill.validate()?;
        self.normalization.validate()?;
        self.export.validate()?;

        if let Some(table) = &self.classification {
            if table.mechanical.iter().chain(table.driver_error.iter()).any(|k| k.trim().is_empty()) {
                return Err(ProcessorError::Config("classification keywords must not be blank".to_string()));
            }
        }

        Ok(())
    }
}

fn check(condition: bool, message: &str) -> Result<(), ProcessorError> {
    if condition {
        Ok(())
    } else {
        Err(ProcessorError::Config(message.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EloConfig {
    /// Rating assigned to a driver on first appearance in a session
    pub initial_rating: f64,
    pub k_rookie: f64,
    pub k_established: f64,
    pub k_elite: f64,
    /// Drivers with fewer applied matchups than this use `k_rookie`
    pub rookie_races: u32,
    /// Reaching this rating latches the elite K-factor permanently
    pub elite_threshold: f64,
    pub rating_floor: f64,
    pub rating_ceiling: f64
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            initial_rating: INITIAL_RATING,
            k_rookie: K_ROOKIE,
            k_established: K_ESTABLISHED,
            k_elite: K_ELITE,
            rookie_races: ROOKIE_RACES,
            elite_threshold: ELITE_THRESHOLD,
            rating_floor: ELO_RATING_FLOOR,
            rating_ceiling: ELO_RATING_CEILING
        }
    }
}

impl EloConfig {
    fn validate(&self) -> Result<(), ProcessorError> {
        check(
            self.k_rookie > 0.0 && self.k_established > 0.0 && self.k_elite > 0.0,
            "elo K-factors must be positive"
        )?;
        check(self.rating_floor < self.rating_ceiling, "elo rating floor must be below the ceiling")?;
        check(
            (self.rating_floor..=self.rating_ceiling).contains(&self.initial_rating),
            "elo initial rating must lie within the rating bounds"
        )
    }
}

/// Which bracketing solver finds the new volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilitySolver {
    #[default]
    Illinois,
    Bisection
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Glicko2Config {
    pub initial_rating: f64,
    pub initial_deviation: f64,
    pub initial_volatility: f64,
    /// System constant constraining volatility change
    pub tau: f64,
    pub rating_floor: f64,
    pub rating_ceiling: f64,
    pub deviation_floor: f64,
    pub deviation_ceiling: f64,
    pub volatility_floor: f64,
    pub volatility_ceiling: f64,
    pub solver: VolatilitySolver,
    pub solver_tolerance: f64,
    pub solver_max_iterations: u32
}

impl Default for Glicko2Config {
    fn default() -> Self {
        Self {
            initial_rating: INITIAL_RATING,
            initial_deviation: DEFAULT_DEVIATION,
            initial_volatility: DEFAULT_VOLATILITY,
            tau: TAU,
            rating_floor: GLICKO_RATING_FLOOR,
            rating_ceiling: GLICKO_RATING_CEILING,
            deviation_floor: DEVIATION_FLOOR,
            deviation_ceiling: DEVIATION_CEILING,
            volatility_floor: VOLATILITY_FLOOR,
            volatility_ceiling: VOLATILITY_CEILING,
            solver: VolatilitySolver::default(),
            solver_tolerance: SOLVER_TOLERANCE,
            solver_max_iterations: SOLVER_MAX_ITERATIONS
        }
    }
}

impl Glicko2Config {
    fn validate(&self) -> Result<(), ProcessorError> {
        check(self.tau > 0.0, "glicko tau must be positive")?;
        check(self.rating_floor < self.rating_ceiling, "glicko rating floor must be below the ceiling")?;
        check(
            self.deviation_floor > 0.0 && self.deviation_floor < self.deviation_ceiling,
            "glicko deviation bounds are invalid"
        )?;
        check(
            self.volatility_floor > 0.0 && self.volatility_floor < self.volatility_ceiling,
            "glicko volatility bounds are invalid"
        )?;
        check(
            self.solver_tolerance > 0.0 && self.solver_max_iterations > 0,
            "glicko solver needs a positive tolerance and iteration cap"
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillAdjustmentConfig {
    /// Points lost per finishing position below first
    pub position_slope: f64,
    /// Raw score of a winner
    pub max_score: f64,
    /// Divides the driver's distance from `baseline` before subtracting it
    pub divisor: f64,
    pub baseline: f64
}

impl Default for SkillAdjustmentConfig {
    fn default() -> Self {
        Self {
            position_slope: POSITION_SLOPE,
            max_score: MAX_PERFORMANCE_SCORE,
            divisor: SKILL_DIVISOR,
            baseline: INITIAL_RATING
        }
    }
}

impl SkillAdjustmentConfig {
    fn validate(&self) -> Result<(), ProcessorError> {
        check(self.divisor != 0.0, "skill adjustment divisor must not be zero")?;
        check(self.position_slope >= 0.0, "position slope must not be negative")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub enabled: bool,
    /// Mean every active pool is shifted to at season close
    pub baseline: f64,
    /// Pools smaller than this are left alone
    pub min_active_pool: usize
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            baseline: NORMALIZATION_BASELINE,
            min_active_pool: MIN_ACTIVE_POOL
        }
    }
}

impl NormalizationConfig {
    fn validate(&self) -> Result<(), ProcessorError> {
        check(self.min_active_pool > 0, "normalization needs a non-empty minimum pool")
    }
}

/// Logistic curve mapping a matchup count to a 0-100 reliability score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityCurve {
    pub center: f64,
    pub width: f64
}

/// Ratings of competitors first active before `before_year` are scaled by `multiplier`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EraBand {
    pub before_year: i32,
    pub multiplier: f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub qualifying_weight: f64,
    pub race_weight: f64,
    pub driver_reliability: ReliabilityCurve,
    pub lineage_reliability: ReliabilityCurve,
    /// Must be sorted by ascending `before_year`; the first matching band wins
    pub era_bands: Vec<EraBand>,
    pub driver_sample_threshold: u32,
    pub lineage_sample_threshold: u32,
    pub sample_penalty: f64,
    /// Used for era bands when a competitor has no recorded activity
    pub default_first_year: i32,
    /// Deviations subtracted per session in the conservative lineage rating
    pub conservative_deviations: f64
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            qualifying_weight: QUALIFYING_WEIGHT,
            race_weight: RACE_WEIGHT,
            driver_reliability: ReliabilityCurve {
                center: DRIVER_RELIABILITY_CENTER,
                width: DRIVER_RELIABILITY_WIDTH
            },
            lineage_reliability: ReliabilityCurve {
                center: LINEAGE_RELIABILITY_CENTER,
                width: LINEAGE_RELIABILITY_WIDTH
            },
            era_bands: vec![
                EraBand {
                    before_year: 1960,
                    multiplier: 0.92
                },
                EraBand {
                    before_year: 1970,
                    multiplier: 0.95
                },
                EraBand {
                    before_year: 1980,
                    multiplier: 0.97
                },
                EraBand {
                    before_year: 2000,
                    multiplier: 0.99
                },
            ],
            driver_sample_threshold: DRIVER_SAMPLE_THRESHOLD,
            lineage_sample_threshold: LINEAGE_SAMPLE_THRESHOLD,
            sample_penalty: SAMPLE_PENALTY,
            default_first_year: DEFAULT_FIRST_YEAR,
            conservative_deviations: CONSERVATIVE_DEVIATIONS
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<(), ProcessorError> {
        check(
            self.qualifying_weight >= 0.0 && self.race_weight >= 0.0,
            "session weights must not be negative"
        )?;
        check(
            self.driver_reliability.width > 0.0 && self.lineage_reliability.width > 0.0,
            "reliability curve widths must be positive"
        )?;
        check(
            self.era_bands.windows(2).all(|w| w[0].before_year < w[1].before_year),
            "era bands must be sorted by ascending year"
        )
    }
}
