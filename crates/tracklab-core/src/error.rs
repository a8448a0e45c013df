//! TrackLab error type.

use thiserror::Error;

/// Unified error for all TrackLab crates.
#[derive(Error, Debug)]
pub enum TrackLabError {
    #[error("config error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Db(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("duration must be {min}..={max} minutes, got {got}")]
    InvalidDuration { got: i64, min: i64, max: i64 },

    #[error("invalid schedule: {0}")]
    Schedule(String),

    #[error("Ollama request failed: {0}")]
    Ollama(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrackLabError>;
