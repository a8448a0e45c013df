//! Notification hub — fan-out of events to live WebSocket subscribers.
//!
//! Each subscriber gets its own unbounded channel, so one slow socket never
//! stalls delivery to the rest. The registry lock is held only to snapshot
//! or mutate the subscriber map — never across a send.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use tracklab_core::types::BusEvent;

/// Registry of live subscribers.
pub struct NotificationHub {
    subscribers: Mutex<HashMap<u64, mpsc::UnboundedSender<String>>>,
    next_id: AtomicU64,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a subscriber; the returned receiver yields serialized events.
    pub fn subscribe(&self) -> (u64, mpsc::UnboundedReceiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.insert(id, tx);
            tracing::info!("WS connected — total clients: {}", subs.len());
        }
        (id, rx)
    }

    pub fn unsubscribe(&self, id: u64) {
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.remove(&id);
            tracing::info!("WS disconnected — total clients: {}", subs.len());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Send `event` to every live subscriber. Subscribers whose channel is
    /// gone are pruned as part of this call. Never blocks, never errors —
    /// delivery is best-effort.
    pub fn broadcast(&self, event: &BusEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("unserializable event dropped: {e}");
                return;
            }
        };

        let targets: Vec<(u64, mpsc::UnboundedSender<String>)> = match self.subscribers.lock() {
            Ok(subs) => subs.iter().map(|(id, tx)| (*id, tx.clone())).collect(),
            Err(_) => return,
        };
        if targets.is_empty() {
            return;
        }

        let mut dead = Vec::new();
        for (id, tx) in targets {
            if tx.send(payload.clone()).is_err() {
                dead.push(id);
            }
        }

        if !dead.is_empty()
            && let Ok(mut subs) = self.subscribers.lock()
        {
            for id in &dead {
                subs.remove(id);
            }
            tracing::info!("pruned {} dead subscriber(s) during broadcast", dead.len());
        }
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain the scheduler's event bridge into the hub. Runs on the gateway
/// runtime; ends when the scheduler drops its sender.
pub fn spawn_bridge_pump(
    hub: Arc<NotificationHub>,
    mut rx: mpsc::UnboundedReceiver<BusEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            hub.broadcast(&event);
        }
        tracing::info!("event bridge pump stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracklab_scheduler::EventBridge;

    #[test]
    fn test_broadcast_reaches_every_live_subscriber() {
        let hub = NotificationHub::new();
        let (_id_a, mut rx_a) = hub.subscribe();
        let (_id_b, mut rx_b) = hub.subscribe();

        hub.broadcast(&BusEvent::summary_ready("2026-02-24"));

        for rx in [&mut rx_a, &mut rx_b] {
            let payload = rx.try_recv().unwrap();
            let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
            assert_eq!(json["type"], "summary_ready");
            assert_eq!(json["data"]["date"], "2026-02-24");
        }
    }

    #[test]
    fn test_broadcast_prunes_exactly_the_dead() {
        let hub = NotificationHub::new();
        let (_live_id, mut live_rx) = hub.subscribe();
        let (_dead_id, dead_rx) = hub.subscribe();
        drop(dead_rx);
        assert_eq!(hub.subscriber_count(), 2);

        hub.broadcast(&BusEvent::activity_popup());

        assert_eq!(hub.subscriber_count(), 1);
        assert!(live_rx.try_recv().is_ok());
    }

    #[test]
    fn test_broadcast_with_no_subscribers() {
        let hub = NotificationHub::new();
        hub.broadcast(&BusEvent::activity_popup());
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe() {
        let hub = NotificationHub::new();
        let (id, _rx) = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);
        hub.unsubscribe(id);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_bridge_to_subscriber_end_to_end() {
        let hub = Arc::new(NotificationHub::new());
        let (id, mut rx) = hub.subscribe();
        let (bridge, bridge_rx) = EventBridge::channel();
        let pump = spawn_bridge_pump(hub.clone(), bridge_rx);

        bridge.post(BusEvent::daily_note_prompt("2026-02-24"));

        let payload = rx.recv().await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(json["type"], "notification");
        assert_eq!(json["action"], "SHOW_DAILY_NOTE_PROMPT");

        hub.unsubscribe(id);
        drop(bridge);
        pump.await.unwrap();
    }
}
