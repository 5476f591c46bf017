use crate::domain::models::Notification;
use crate::repository::NotificationRepository;
use realtime_events::{EventEnvelope, EventPublisher, EventType};
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

/// Generates notification rows for an audience and pushes the matching
/// per-recipient realtime events.
///
/// Runs only inside detached fanout tasks: every failure here is logged
/// and swallowed, never surfaced to the caller of the mutation.
#[derive(Clone)]
pub struct NotificationFanout {
    notifications: NotificationRepository,
    publisher: EventPublisher,
    channel: String,
}

impl NotificationFanout {
    pub fn new(
        notifications: NotificationRepository,
        publisher: EventPublisher,
        channel: String,
    ) -> Self {
        Self {
            notifications,
            publisher,
            channel,
        }
    }

    /// Create one notification per audience member and publish a
    /// per-recipient event for each successful insert.
    ///
    /// Partial-failure tolerant: a failed insert or publish for one member
    /// never blocks the rest. Returns the successfully created rows.
    pub async fn notify_audience(
        &self,
        audience: &HashSet<Uuid>,
        video_id: Uuid,
        message: &str,
    ) -> Vec<Notification> {
        let mut created = Vec::with_capacity(audience.len());

        for &recipient in audience {
            let notification = match self
                .notifications
                .create(recipient, Some(video_id), message)
                .await
            {
                Ok(n) => n,
                Err(err) => {
                    warn!(
                        error = %err,
                        recipient = %recipient,
                        video_id = %video_id,
                        "Failed to create notification, skipping recipient"
                    );
                    continue;
                }
            };

            let envelope = EventEnvelope::direct(
                EventType::NotificationCreated,
                recipient,
                serde_json::json!({
                    "id": notification.id,
                    "message": notification.message,
                    "read": notification.read,
                    "createdAt": notification.created_at.to_rfc3339(),
                }),
            );
            if let Err(err) = self.publisher.publish(&self.channel, &envelope).await {
                warn!(
                    error = %err,
                    recipient = %recipient,
                    "Failed to publish notification event"
                );
            }

            created.push(notification);
        }

        created
    }
}

/// Message shown to the audience when someone likes a video
pub fn like_message(video_title: &str) -> String {
    format!("Someone liked \"{}\"", video_title)
}

/// Message shown to the audience when someone comments on a video
pub fn comment_message(video_title: &str) -> String {
    format!(
        "Someone commented on \"{}\", a video you interacted with",
        video_title
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_message_includes_title() {
        assert_eq!(like_message("cat video"), "Someone liked \"cat video\"");
    }

    #[test]
    fn comment_message_includes_title() {
        let msg = comment_message("cat video");
        assert!(msg.contains("cat video"));
        assert!(msg.contains("commented"));
    }
}
