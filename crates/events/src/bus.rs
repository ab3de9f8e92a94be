//! In-process feed bus backed by a `tokio::sync::broadcast` channel.
//!
//! Shared via `Arc<FeedBus>`. Subscribers that fall behind observe
//! `RecvError::Lagged` and should treat it as "refresh everything".

use campus_core::types::{DbId, Timestamp, UserId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// FeedEvent
// ---------------------------------------------------------------------------

/// Something that changed the feed, or the result of rebuilding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEvent {
    /// One of the names in [`crate::kinds`].
    pub event_type: String,

    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,

    /// The viewer whose action triggered the event.
    pub actor_user_id: Option<UserId>,

    /// Event-specific data, an empty object by default.
    pub payload: serde_json::Value,

    pub timestamp: Timestamp,
}

impl FeedEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, user_id: UserId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// FeedBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

pub struct FeedBus {
    sender: broadcast::Sender<FeedEvent>,
}

impl FeedBus {
    /// Create a bus holding at most `capacity` unconsumed events.
    ///
    /// A capacity of zero is raised to one; `broadcast::channel` rejects it.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped silently when there are
    /// none.
    pub fn publish(&self, event: FeedEvent) {
        tracing::trace!(event_type = %event.event_type, "Publishing feed event");
        // SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for FeedBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for FeedBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use campus_core::types::UserId;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    use super::*;
    use crate::kinds;

    #[tokio::test]
    async fn subscriber_receives_enriched_event() {
        let bus = FeedBus::default();
        let mut rx = bus.subscribe();
        let actor = UserId::from_u128(7);

        bus.publish(
            FeedEvent::new(kinds::COMMENT_POSTED)
                .with_source(kinds::ENTITY_COMMENT, 42)
                .with_actor(actor)
                .with_payload(serde_json::json!({"event_id": 3})),
        );

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type, "comment.posted");
        assert_eq!(received.source_entity_type.as_deref(), Some("comment"));
        assert_eq!(received.source_entity_id, Some(42));
        assert_eq!(received.actor_user_id, Some(actor));
        assert_eq!(received.payload["event_id"], 3);
    }

    #[tokio::test]
    async fn every_subscriber_sees_each_event() {
        let bus = FeedBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(FeedEvent::new(kinds::FEED_REFRESHED));

        assert_eq!(rx1.recv().await.unwrap().event_type, kinds::FEED_REFRESHED);
        assert_eq!(rx2.recv().await.unwrap().event_type, kinds::FEED_REFRESHED);
    }

    #[test]
    fn publishing_without_subscribers_is_a_no_op() {
        let bus = FeedBus::new(0);
        bus.publish(FeedEvent::new(kinds::GROUP_LEFT));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn slow_subscriber_observes_lag() {
        let bus = FeedBus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..3 {
            bus.publish(FeedEvent::new(kinds::FEED_REFRESHED));
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(1))));
        assert!(rx.recv().await.is_ok());
        assert!(rx.recv().await.is_ok());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn bare_event_has_empty_object_payload() {
        let event = FeedEvent::new(kinds::GROUP_JOINED);
        assert!(event.source_entity_id.is_none());
        assert!(event.actor_user_id.is_none());
        assert!(event.payload.as_object().is_some_and(|o| o.is_empty()));
    }
}
