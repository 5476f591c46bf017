//! Realtime Event Publishing over Redis Pub/Sub
//!
//! Provides a typed event envelope and an explicitly constructed publisher
//! for pushing interaction events to the realtime delivery gateway.
//!
//! # Architecture
//!
//! ```text
//! interaction-service:
//!   1. Commit mutation in PostgreSQL
//!   2. Publish event to Redis:
//!      PUBLISH notifications {"type": "video:like", "data": {...}}
//!      ↓
//! Redis Pub/Sub (broadcast to all subscribers)
//!      ↓
//! Websocket gateway:
//!   3. Receive event, push to connected clients
//!      (events with a "to" hint are routed to that user's sockets only)
//! ```
//!
//! Delivery is best-effort and at-most-one attempt per event: a subscriber
//! that is not connected at publish time simply misses the event.
//!
//! # Example
//!
//! ```no_run
//! use realtime_events::{EventEnvelope, EventPublisher, EventType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), realtime_events::PublishError> {
//!     let publisher = EventPublisher::connect(
//!         "redis://localhost:6379",
//!         "interaction-service".to_string(),
//!     ).await?;
//!
//!     let envelope = EventEnvelope::broadcast(
//!         EventType::LikeChanged,
//!         serde_json::json!({ "videoID": "...", "totalLikeCount": 3 }),
//!     );
//!     publisher.publish(EventPublisher::DEFAULT_CHANNEL, &envelope).await?;
//!     Ok(())
//! }
//! ```

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Errors raised while publishing an event.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to serialize event envelope: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] redis::RedisError),
}

/// Event kinds understood by the realtime gateway.
///
/// The wire tags match the websocket protocol consumed by clients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventType {
    #[serde(rename = "video:like")]
    LikeChanged,
    #[serde(rename = "video:comment")]
    CommentAdded,
    #[serde(rename = "video:view")]
    ViewChanged,
    #[serde(rename = "notification")]
    NotificationCreated,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::LikeChanged => "video:like",
            EventType::CommentAdded => "video:comment",
            EventType::ViewChanged => "video:view",
            EventType::NotificationCreated => "notification",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ephemeral event envelope.
///
/// Not persisted anywhere; its lifetime is the publish call. Events with a
/// `to` hint are routed to a single user's connections, events without one
/// are broadcast to every subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Uuid>,
    pub data: serde_json::Value,
}

impl EventEnvelope {
    /// Envelope addressed to every connected client.
    pub fn broadcast(event_type: EventType, data: serde_json::Value) -> Self {
        Self {
            event_type,
            to: None,
            data,
        }
    }

    /// Envelope addressed to a single recipient.
    pub fn direct(event_type: EventType, to: Uuid, data: serde_json::Value) -> Self {
        Self {
            event_type,
            to: Some(to),
            data,
        }
    }
}

/// Publisher for realtime interaction events.
///
/// Owns its Redis connection; construct once at startup and clone into the
/// tasks that need it. Dropping the last clone tears the connection down.
#[derive(Clone)]
pub struct EventPublisher {
    conn: ConnectionManager,
    service_name: String,
}

impl EventPublisher {
    /// Default Redis channel the websocket gateway subscribes to.
    pub const DEFAULT_CHANNEL: &'static str = "notifications";

    /// Connect to Redis and build a publisher.
    ///
    /// `service_name` labels log lines so multiple publishers sharing a
    /// channel stay distinguishable.
    pub async fn connect(redis_url: &str, service_name: String) -> Result<Self, PublishError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self { conn, service_name })
    }

    /// Serialize the envelope and PUBLISH it on `channel`.
    ///
    /// Returns the number of subscribers that received the message. No
    /// delivery acknowledgment beyond that; failures surface as
    /// `PublishError` and are the caller's to log.
    pub async fn publish(
        &self,
        channel: &str,
        envelope: &EventEnvelope,
    ) -> Result<usize, PublishError> {
        let payload = serde_json::to_string(envelope)?;

        let mut conn = self.conn.clone();
        let subscriber_count: usize = conn.publish(channel, payload).await?;

        debug!(
            service = %self.service_name,
            event_type = %envelope.event_type,
            channel = %channel,
            subscribers = subscriber_count,
            "Published realtime event"
        );

        Ok(subscriber_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_envelope_omits_recipient() {
        let envelope = EventEnvelope::broadcast(
            EventType::LikeChanged,
            serde_json::json!({ "totalLikeCount": 3 }),
        );

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&envelope).unwrap()).unwrap();
        assert_eq!(json["type"], "video:like");
        assert!(json.get("to").is_none());
        assert_eq!(json["data"]["totalLikeCount"], 3);
    }

    #[test]
    fn direct_envelope_carries_recipient() {
        let recipient = Uuid::new_v4();
        let envelope = EventEnvelope::direct(
            EventType::NotificationCreated,
            recipient,
            serde_json::json!({ "message": "hi" }),
        );

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&envelope).unwrap()).unwrap();
        assert_eq!(json["type"], "notification");
        assert_eq!(json["to"], recipient.to_string());
    }

    #[test]
    fn event_type_wire_tags() {
        assert_eq!(EventType::LikeChanged.to_string(), "video:like");
        assert_eq!(EventType::CommentAdded.to_string(), "video:comment");
        assert_eq!(EventType::ViewChanged.to_string(), "video:view");
        assert_eq!(EventType::NotificationCreated.to_string(), "notification");
    }

    #[test]
    fn envelope_round_trips() {
        let envelope = EventEnvelope::direct(
            EventType::CommentAdded,
            Uuid::new_v4(),
            serde_json::json!({ "videoID": "x" }),
        );
        let decoded: EventEnvelope =
            serde_json::from_str(&serde_json::to_string(&envelope).unwrap()).unwrap();
        assert_eq!(decoded.event_type, EventType::CommentAdded);
        assert_eq!(decoded.to, envelope.to);
    }
}
