//! # TrackLab Core
//!
//! Shared foundation for the TrackLab workspace: configuration loading,
//! the error type, domain entities, and the WebSocket event schema.

pub mod config;
pub mod error;
pub mod types;

pub use config::TrackLabConfig;
pub use error::{Result, TrackLabError};
