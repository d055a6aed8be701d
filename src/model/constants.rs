// Elo constants
pub const INITIAL_RATING: f64 = 1500.0;
pub const K_ROOKIE: f64 = 40.0;
pub const K_ESTABLISHED: f64 = 20.0;
pub const K_ELITE: f64 = 10.0;
pub const ROOKIE_RACES: u32 = 30;
pub const ELITE_THRESHOLD: f64 = 1750.0;
pub const ELO_RATING_FLOOR: f64 = 800.0;
pub const ELO_RATING_CEILING: f64 = 2400.0;
pub const ELO_SCALE: f64 = 400.0;
// Glicko-2 constants
pub const GLICKO_SCALE: f64 = 173.7178;
pub const DEFAULT_DEVIATION: f64 = 350.0;
pub const DEFAULT_VOLATILITY: f64 = 0.06;
pub const TAU: f64 = 0.5;
pub const GLICKO_RATING_FLOOR: f64 = 800.0;
pub const GLICKO_RATING_CEILING: f64 = 2200.0;
pub const DEVIATION_FLOOR: f64 = 30.0;
pub const DEVIATION_CEILING: f64 = 350.0;
pub const VOLATILITY_FLOOR: f64 = 0.01;
pub const VOLATILITY_CEILING: f64 = 0.5;
pub const SOLVER_TOLERANCE: f64 = 1e-6;
pub const SOLVER_MAX_ITERATIONS: u32 = 100;
// Lineage performance sample
pub const POSITION_SLOPE: f64 = 5.0;
pub const MAX_PERFORMANCE_SCORE: f64 = 100.0;
pub const SKILL_DIVISOR: f64 = 10.0;
// Season normalization
pub const NORMALIZATION_BASELINE: f64 = 1500.0;
pub const MIN_ACTIVE_POOL: usize = 2;
// Export
pub const QUALIFYING_WEIGHT: f64 = 0.3;
pub const RACE_WEIGHT: f64 = 0.7;
pub const DRIVER_RELIABILITY_CENTER: f64 = 30.0;
pub const DRIVER_RELIABILITY_WIDTH: f64 = 20.0;
pub const LINEAGE_RELIABILITY_CENTER: f64 = 100.0;
pub const LINEAGE_RELIABILITY_WIDTH: f64 = 50.0;
pub const DRIVER_SAMPLE_THRESHOLD: u32 = 30;
pub const LINEAGE_SAMPLE_THRESHOLD: u32 = 100;
pub const SAMPLE_PENALTY: f64 = 0.95;
pub const DEFAULT_FIRST_YEAR: i32 = 2000;
pub const CONSERVATIVE_DEVIATIONS: f64 = 2.0;
