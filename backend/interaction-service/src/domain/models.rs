use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Video entity - shared content item with denormalized counters.
///
/// `total_like_count` is kept equal to the number of rows in `likes`
/// referencing the video, recomputed inside every mutating transaction.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub total_like_count: i64,
    pub total_view_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Comment entity - no uniqueness constraint, multiple per user allowed
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub video_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Notification entity - created once per audience member per interaction,
/// mutated only by the owning user marking it read
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub video_id: Option<Uuid>,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
