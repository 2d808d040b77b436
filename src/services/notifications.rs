//! Fire-and-forget settlement notifications
//!
//! Keeps a bounded history per user and fans events out to WebSocket
//! subscribers over a broadcast channel.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::models::notification::Notification;

const CHANNEL_CAPACITY: usize = 1000;
const DEFAULT_HISTORY_PER_USER: usize = 50;

#[derive(Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<Notification>,
    history: Arc<RwLock<HashMap<String, VecDeque<Notification>>>>,
    history_per_user: usize,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::with_history(DEFAULT_HISTORY_PER_USER)
    }

    pub fn with_history(history_per_user: usize) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            history: Arc::new(RwLock::new(HashMap::new())),
            history_per_user: history_per_user.max(1),
        }
    }

    pub fn publish(&self, notification: Notification) {
        {
            let mut history = self.history.write();
            let entries = history.entry(notification.user_id.clone()).or_default();
            entries.push_front(notification.clone());
            entries.truncate(self.history_per_user);
        }

        tracing::info!(
            user_id = %notification.user_id,
            token = %notification.token_symbol,
            "{}",
            notification.message
        );

        // Ignore errors if no subscribers
        let _ = self.tx.send(notification);
    }

    /// Newest first
    pub fn recent(&self, user_id: &str) -> Vec<Notification> {
        self.history
            .read()
            .get(user_id)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::NotificationKind;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn notification(user_id: &str, message: &str) -> Notification {
        Notification {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind: NotificationKind::TradeSettled,
            message: message.to_string(),
            creator_id: "1".to_string(),
            token_symbol: "TILL".to_string(),
            amount: dec!(1),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_history_newest_first_and_bounded() {
        let hub = NotificationHub::with_history(2);
        hub.publish(notification("alice", "first"));
        hub.publish(notification("alice", "second"));
        hub.publish(notification("alice", "third"));
        hub.publish(notification("bob", "other"));

        let messages: Vec<String> = hub.recent("alice").into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["third", "second"]);
        assert_eq!(hub.recent("bob").len(), 1);
        assert!(hub.recent("carol").is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let hub = NotificationHub::new();
        let mut rx = hub.subscribe();
        hub.publish(notification("alice", "settled"));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.message, "settled");
    }

    #[test]
    fn test_publish_without_subscribers() {
        let hub = NotificationHub::new();
        hub.publish(notification("alice", "nobody listening"));
        assert_eq!(hub.recent("alice").len(), 1);
    }
}
