//! # TrackLab DB
//!
//! SQLite persistence for the planning hierarchy (plans → projects →
//! activities), work logs, and daily summaries, plus the status-cascade
//! engine that keeps derived project/activity statuses consistent whenever a
//! work log lands.

mod cascade;
pub mod dashboard;
pub mod store;

pub use dashboard::DashboardPayload;
pub use store::Database;
