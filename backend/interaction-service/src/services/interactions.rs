use crate::domain::models::{Comment, Notification, Video};
use crate::error::{AppError, Result};
use crate::repository::{
    CommentRepository, LikeRepository, LikeToggle, NotificationRepository, VideoRepository,
};
use crate::services::audience::AudienceResolver;
use crate::services::notifier::{self, NotificationFanout};
use realtime_events::{EventEnvelope, EventPublisher, EventType};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

/// Orchestrates interaction mutations and their notification fanout.
///
/// Mutations run synchronously against the store and the caller gets the
/// committed result. Audience resolution, notification inserts, and event
/// publishing run in a detached task after commit, so the caller's latency
/// is bounded by the mutation alone.
#[derive(Clone)]
pub struct InteractionService {
    videos: VideoRepository,
    likes: LikeRepository,
    comments: CommentRepository,
    notifications: NotificationRepository,
    audience: AudienceResolver,
    fanout: NotificationFanout,
    publisher: EventPublisher,
    channel: String,
}

impl InteractionService {
    pub fn new(pool: PgPool, publisher: EventPublisher, channel: String) -> Self {
        let notifications = NotificationRepository::new(pool.clone());
        let fanout = NotificationFanout::new(
            notifications.clone(),
            publisher.clone(),
            channel.clone(),
        );

        Self {
            videos: VideoRepository::new(pool.clone()),
            likes: LikeRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            notifications,
            audience: AudienceResolver::new(pool),
            fanout,
            publisher,
            channel,
        }
    }

    // ========== Likes ==========

    /// Toggle the actor's like on a video.
    ///
    /// Returns as soon as the mutating transaction commits; fanout runs in
    /// a detached task. A first-time like notifies prior interactors, an
    /// unlike only broadcasts the new count.
    pub async fn toggle_like(&self, video_id: Uuid, actor: Uuid) -> Result<LikeToggle> {
        let outcome = self.likes.toggle_like(video_id, actor).await?;

        let this = self.clone();
        let task_outcome = outcome.clone();
        tokio::spawn(async move {
            this.like_fanout(video_id, actor, task_outcome).await;
        });

        Ok(outcome)
    }

    /// Remove the actor's like (explicit unlike, non-toggle path)
    pub async fn delete_like(&self, video_id: Uuid, actor: Uuid) -> Result<i64> {
        let total_likes = self.likes.delete_like(video_id, actor).await?;

        let this = self.clone();
        tokio::spawn(async move {
            let envelope = EventEnvelope::broadcast(
                EventType::LikeChanged,
                serde_json::json!({
                    "videoID": video_id,
                    "totalLikeCount": total_likes,
                    "hasLiked": false,
                }),
            );
            if let Err(err) = this.publisher.publish(&this.channel, &envelope).await {
                warn!(error = %err, video_id = %video_id, "Failed to broadcast like count change");
            }
        });

        Ok(total_likes)
    }

    /// Current like count plus whether the viewer has liked the video
    pub async fn get_like_state(&self, video_id: Uuid, viewer: Uuid) -> Result<(i64, bool)> {
        let video = self.videos.get_video(video_id).await?;
        let has_liked = self.likes.has_liked(video_id, viewer).await?;
        Ok((video.total_like_count, has_liked))
    }

    async fn like_fanout(&self, video_id: Uuid, actor: Uuid, outcome: LikeToggle) {
        let plan = plan_like_fanout(video_id, &outcome);

        if let Some(message) = plan.notify_message {
            match self.audience.resolve(video_id, actor).await {
                Ok(audience) => {
                    self.fanout
                        .notify_audience(&audience, video_id, &message)
                        .await;
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        video_id = %video_id,
                        "Failed to resolve audience, skipping like notifications"
                    );
                }
            }
        }

        if let Err(err) = self.publisher.publish(&self.channel, &plan.broadcast).await {
            warn!(error = %err, video_id = %video_id, "Failed to broadcast like change");
        }
    }

    // ========== Comments ==========

    /// Add a comment; every comment is a new interaction, so the fanout
    /// always notifies and always broadcasts.
    pub async fn add_comment(&self, video_id: Uuid, actor: Uuid, content: &str) -> Result<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation(
                "Comment content must not be empty".to_string(),
            ));
        }

        let (comment, video_title) = self
            .comments
            .create_comment(video_id, actor, content)
            .await?;

        let this = self.clone();
        let task_comment = comment.clone();
        tokio::spawn(async move {
            this.comment_fanout(video_id, actor, task_comment, video_title)
                .await;
        });

        Ok(comment)
    }

    pub async fn delete_comment(
        &self,
        comment_id: Uuid,
        video_id: Uuid,
        actor: Uuid,
    ) -> Result<()> {
        self.comments
            .delete_comment(comment_id, video_id, actor)
            .await
    }

    pub async fn list_comments(&self, video_id: Uuid) -> Result<Vec<Comment>> {
        self.comments.list_comments(video_id).await
    }

    async fn comment_fanout(
        &self,
        video_id: Uuid,
        actor: Uuid,
        comment: Comment,
        video_title: String,
    ) {
        match self.audience.resolve(video_id, actor).await {
            Ok(audience) => {
                let message = notifier::comment_message(&video_title);
                self.fanout
                    .notify_audience(&audience, video_id, &message)
                    .await;
            }
            Err(err) => {
                warn!(
                    error = %err,
                    video_id = %video_id,
                    "Failed to resolve audience, skipping comment notifications"
                );
            }
        }

        let envelope = EventEnvelope::broadcast(
            EventType::CommentAdded,
            serde_json::json!({
                "videoID": video_id,
                "videoTitle": video_title,
                "comment": {
                    "id": comment.id,
                    "content": comment.content,
                    "userId": comment.user_id,
                    "createdAt": comment.created_at.to_rfc3339(),
                },
            }),
        );
        if let Err(err) = self.publisher.publish(&self.channel, &envelope).await {
            warn!(error = %err, video_id = %video_id, "Failed to broadcast new comment");
        }
    }

    // ========== Views ==========

    /// Record one view; the new count is broadcast from a detached task.
    pub async fn record_view(&self, video_id: Uuid) -> Result<i64> {
        let views = self.videos.record_view(video_id).await?;

        let this = self.clone();
        tokio::spawn(async move {
            let envelope = plan_view_broadcast(video_id, views);
            if let Err(err) = this.publisher.publish(&this.channel, &envelope).await {
                warn!(error = %err, video_id = %video_id, "Failed to broadcast view count change");
            }
        });

        Ok(views)
    }

    pub async fn get_video(&self, video_id: Uuid) -> Result<Video> {
        self.videos.get_video(video_id).await
    }

    // ========== Notifications ==========

    pub async fn list_unread_notifications(&self, actor: Uuid) -> Result<Vec<Notification>> {
        self.notifications.list_unread(actor).await
    }

    pub async fn mark_notification_read(&self, notification_id: Uuid, actor: Uuid) -> Result<()> {
        self.notifications.mark_read(notification_id, actor).await
    }
}

/// What a committed like toggle owes the realtime channel.
struct LikeFanoutPlan {
    /// Message for prior interactors; None when the toggle removed a like
    notify_message: Option<String>,
    broadcast: EventEnvelope,
}

/// Decide the fanout for a committed toggle. Only a new like notifies the
/// audience; the count broadcast goes out for likes and unlikes alike.
/// hasLiked is the actor's post-toggle state, not a per-recipient flag.
fn plan_like_fanout(video_id: Uuid, outcome: &LikeToggle) -> LikeFanoutPlan {
    let notify_message = outcome
        .liked
        .then(|| notifier::like_message(&outcome.video_title));

    let broadcast = EventEnvelope::broadcast(
        EventType::LikeChanged,
        serde_json::json!({
            "videoID": video_id,
            "videoTitle": outcome.video_title,
            "totalLikeCount": outcome.total_likes,
            "hasLiked": outcome.liked,
        }),
    );

    LikeFanoutPlan {
        notify_message,
        broadcast,
    }
}

fn plan_view_broadcast(video_id: Uuid, total_views: i64) -> EventEnvelope {
    EventEnvelope::broadcast(
        EventType::ViewChanged,
        serde_json::json!({
            "videoID": video_id,
            "totalViewCount": total_views,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggle(liked: bool, total_likes: i64) -> LikeToggle {
        LikeToggle {
            liked,
            total_likes,
            video_title: "cat video".to_string(),
        }
    }

    #[test]
    fn first_like_plans_audience_notifications() {
        let plan = plan_like_fanout(Uuid::new_v4(), &toggle(true, 1));

        let message = plan.notify_message.expect("a new like notifies");
        assert!(message.contains("cat video"));

        let json = serde_json::to_value(&plan.broadcast).unwrap();
        assert_eq!(json["type"], "video:like");
        assert_eq!(json["data"]["hasLiked"], true);
        assert_eq!(json["data"]["totalLikeCount"], 1);
    }

    #[test]
    fn unlike_plans_broadcast_only() {
        let plan = plan_like_fanout(Uuid::new_v4(), &toggle(false, 0));

        assert!(plan.notify_message.is_none());

        let json = serde_json::to_value(&plan.broadcast).unwrap();
        assert_eq!(json["type"], "video:like");
        assert_eq!(json["data"]["hasLiked"], false);
        assert_eq!(json["data"]["totalLikeCount"], 0);
        assert!(json.get("to").is_none());
    }

    #[test]
    fn view_broadcast_carries_the_new_count() {
        let video_id = Uuid::new_v4();
        let envelope = plan_view_broadcast(video_id, 42);

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "video:view");
        assert_eq!(json["data"]["videoID"], video_id.to_string());
        assert_eq!(json["data"]["totalViewCount"], 42);
        assert!(json.get("to").is_none());
    }
}
