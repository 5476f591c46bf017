use crate::error::{AppError, Result};
use sqlx::PgPool;
use uuid::Uuid;

/// Outcome of a committed like toggle.
#[derive(Debug, Clone)]
pub struct LikeToggle {
    /// True when the toggle created a like, false when it removed one
    pub liked: bool,
    /// Authoritative like count after commit
    pub total_likes: i64,
    /// Title of the video, for fanout payloads
    pub video_title: String,
}

/// Repository for Like operations and the denormalized like counter
#[derive(Clone)]
pub struct LikeRepository {
    pool: PgPool,
}

impl LikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Toggle a like inside a single transaction.
    ///
    /// Locks the video row, then any existing like row, so concurrent
    /// toggles for the same (user, video) pair serialize at the lock.
    /// The counter is recomputed from the likes table rather than
    /// incremented, which also repairs any prior drift.
    pub async fn toggle_like(&self, video_id: Uuid, user_id: Uuid) -> Result<LikeToggle> {
        let mut tx = self.pool.begin().await?;

        let video_title: Option<String> =
            sqlx::query_scalar("SELECT title FROM videos WHERE id = $1 FOR UPDATE")
                .bind(video_id)
                .fetch_optional(&mut *tx)
                .await?;
        let video_title = video_title
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

        let existing: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM likes
            WHERE user_id = $1 AND video_id = $2
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .fetch_optional(&mut *tx)
        .await?;

        let liked = match existing {
            Some(like_id) => {
                sqlx::query("DELETE FROM likes WHERE id = $1")
                    .bind(like_id)
                    .execute(&mut *tx)
                    .await?;
                false
            }
            None => {
                // DO NOTHING absorbs duplicate first-likes that raced past
                // the row lock; the recount below still lands on the truth.
                sqlx::query(
                    r#"
                    INSERT INTO likes (user_id, video_id)
                    VALUES ($1, $2)
                    ON CONFLICT (user_id, video_id) DO NOTHING
                    "#,
                )
                .bind(user_id)
                .bind(video_id)
                .execute(&mut *tx)
                .await?;
                true
            }
        };

        let total_likes = self.recount_and_store(&mut tx, video_id).await?;

        tx.commit().await?;

        Ok(LikeToggle {
            liked,
            total_likes,
            video_title,
        })
    }

    /// Delete a like explicitly (non-toggle path).
    ///
    /// Fails with NotFound when no like exists; otherwise recounts the
    /// counter inside the same transaction, same as toggling.
    pub async fn delete_like(&self, video_id: Uuid, user_id: Uuid) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM videos WHERE id = $1 FOR UPDATE")
            .bind(video_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

        let result = sqlx::query(
            r#"
            DELETE FROM likes
            WHERE user_id = $1 AND video_id = $2
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Like not found".to_string()));
        }

        let total_likes = self.recount_and_store(&mut tx, video_id).await?;

        tx.commit().await?;

        Ok(total_likes)
    }

    /// Check if user has liked a video
    pub async fn has_liked(&self, video_id: Uuid, user_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM likes
                WHERE user_id = $1 AND video_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Recount active likes and write the result into the video row.
    /// Must run inside the transaction that mutated the likes table.
    async fn recount_and_store(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        video_id: Uuid,
    ) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE video_id = $1")
            .bind(video_id)
            .fetch_one(&mut **tx)
            .await?;

        sqlx::query("UPDATE videos SET total_like_count = $2 WHERE id = $1")
            .bind(video_id)
            .bind(total)
            .execute(&mut **tx)
            .await?;

        Ok(total)
    }
}
