use crate::domain::models::Video;
use crate::error::{AppError, Result};
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for Video rows and the denormalized view counter
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a video row (seed/ingest support)
    pub async fn create_video(&self, title: &str) -> Result<Video> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            INSERT INTO videos (title)
            VALUES ($1)
            RETURNING id, title, total_like_count, total_view_count, created_at
            "#,
        )
        .bind(title)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    /// Fetch a video by id
    pub async fn get_video(&self, video_id: Uuid) -> Result<Video> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, title, total_like_count, total_view_count, created_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        video.ok_or_else(|| AppError::NotFound("Video not found".to_string()))
    }

    /// Record one view, atomically incrementing the counter.
    ///
    /// Views carry no aggregate invariant beyond the atomic column update,
    /// so no row lock or recount is needed here.
    pub async fn record_view(&self, video_id: Uuid) -> Result<i64> {
        let views: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE videos
            SET total_view_count = total_view_count + 1
            WHERE id = $1
            RETURNING total_view_count
            "#,
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        views.ok_or_else(|| AppError::NotFound("Video not found".to_string()))
    }
}
