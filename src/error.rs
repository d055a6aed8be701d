use std::path::PathBuf;

use thiserror::Error;

use crate::model::structures::event::EventKey;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Event at {next} arrived after {previous}; events must be replayed in (date, round) order")]
    OutOfOrder { previous: EventKey, next: EventKey },

    #[error("Event of season {next} arrived after season {previous}")]
    SeasonRegression { previous: i32, next: i32 },

    #[error("Season {season} was already closed and normalized")]
    SeasonAlreadyClosed { season: i32 },

    #[error("Processing halted after an ordering violation")]
    Halted,

    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String)
}

impl ProcessorError {
    /// Ordering violations stop the model for good.
    pub fn is_ordering_violation(&self) -> bool {
        matches!(
            self,
            ProcessorError::OutOfOrder { .. } | ProcessorError::SeasonRegression { .. } | ProcessorError::SeasonAlreadyClosed { .. }
        )
    }
}
