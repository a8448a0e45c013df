//! Cross-context event bridge.
//!
//! The scheduler thread owns no WebSocket state; everything it wants the
//! frontend to see goes through this channel and is broadcast by a pump task
//! on the gateway runtime. `post` never blocks, and a closed bridge (gateway
//! shut down first) is a warning, not a job failure.

use tokio::sync::mpsc;

use tracklab_core::types::BusEvent;

/// Sending half of the bridge, held by the scheduler engine.
#[derive(Clone)]
pub struct EventBridge {
    tx: mpsc::UnboundedSender<BusEvent>,
}

impl EventBridge {
    /// Create the bridge. The receiver belongs to the gateway runtime.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BusEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueue an event for broadcast on the primary context.
    pub fn post(&self, event: BusEvent) {
        if self.tx.send(event).is_err() {
            tracing::warn!("event bridge closed — broadcast dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_post_delivers() {
        let (bridge, mut rx) = EventBridge::channel();
        bridge.post(BusEvent::summary_ready("2026-02-24"));
        let event = rx.recv().await.unwrap();
        assert_eq!(event, BusEvent::summary_ready("2026-02-24"));
    }

    #[tokio::test]
    async fn test_post_after_receiver_drop_is_harmless() {
        let (bridge, rx) = EventBridge::channel();
        drop(rx);
        bridge.post(BusEvent::activity_popup());
    }
}
