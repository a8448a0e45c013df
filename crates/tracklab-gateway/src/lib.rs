//! # TrackLab Gateway
//!
//! The HTTP/WebSocket surface: work-log ingestion, manual triggers for the
//! analysis pipeline and popups, the dashboard payload, and the notification
//! hub that fans events out to every connected client.

pub mod hub;
pub mod routes;
pub mod server;
pub mod ws;

pub use hub::{NotificationHub, spawn_bridge_pump};
pub use server::{AppState, build_router, serve};
