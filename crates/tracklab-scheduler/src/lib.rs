//! # TrackLab Scheduler
//!
//! Wall-clock job scheduling on a dedicated thread, bridged into the
//! gateway's async context by a message channel.
//!
//! ## Architecture
//! ```text
//! scheduler thread (current-thread tokio runtime)
//!   ├── popup job:       Mon–Fri, :30 past each hour, 08:30–17:30
//!   ├── daily-note job:  Mon–Fri at 16:55
//!   ├── analysis job:    Mon–Fri at 17:00 → Ollama pipeline → upsert
//!   └── one-shot jobs:   debug popups at a caller-chosen instant
//!         │
//!         ▼ EventBridge (unbounded channel — never blocks the thread)
//! gateway runtime
//!   └── pump task → NotificationHub::broadcast → WebSocket clients
//! ```
//!
//! Jobs are declarative and re-registered fresh on boot; nothing here
//! persists across restarts. A due occurrence older than its grace window is
//! skipped, never replayed.

pub mod bridge;
pub mod engine;
pub mod jobs;
pub mod spec;

pub use bridge::EventBridge;
pub use engine::{JobContext, SchedulerClient, SchedulerCommand, SchedulerEngine, SchedulerHandle, spawn};
pub use jobs::{Job, JobAction, JobStatus, Trigger};
pub use spec::{HourSpec, WeekdaySchedule};
