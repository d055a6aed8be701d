pub mod adjustment_type;
pub mod classification;
pub mod directory;
pub mod event;
pub mod matchup;
pub mod rating;
pub mod rating_adjustment;
pub mod replay_stats;
pub mod session_type;
pub mod snapshot;

pub type DriverId = i32;
pub type ConstructorId = i32;
/// Persistent key shared by every constructor identity of one team.
pub type LineageId = i32;
