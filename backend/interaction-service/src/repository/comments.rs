use crate::domain::models::Comment;
use crate::error::{AppError, Result};
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for Comment operations
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new comment.
    ///
    /// Returns the created row plus the video title for fanout payloads.
    /// No row locking: comments protect no aggregate invariant.
    pub async fn create_comment(
        &self,
        video_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<(Comment, String)> {
        let video_title: Option<String> =
            sqlx::query_scalar("SELECT title FROM videos WHERE id = $1")
                .bind(video_id)
                .fetch_optional(&self.pool)
                .await?;
        let video_title = video_title
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (video_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, video_id, user_id, content, created_at
            "#,
        )
        .bind(video_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok((comment, video_title))
    }

    /// Delete a comment, constrained to the authoring user.
    ///
    /// The (id, video, user) triple must match exactly one row; a missing
    /// row and a foreign row are indistinguishable to the caller.
    pub async fn delete_comment(
        &self,
        comment_id: Uuid,
        video_id: Uuid,
        user_id: Uuid,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE id = $1 AND video_id = $2 AND user_id = $3
            "#,
        )
        .bind(comment_id)
        .bind(video_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "Comment not found or not authorized".to_string(),
            ));
        }

        Ok(())
    }

    /// List comments for a video, oldest first
    pub async fn list_comments(&self, video_id: Uuid) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, video_id, user_id, content, created_at
            FROM comments
            WHERE video_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(video_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}
