use crate::domain::models::Notification;
use crate::error::{AppError, Result};
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for Notification rows
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Durably create one unread notification
    pub async fn create(
        &self,
        user_id: Uuid,
        video_id: Option<Uuid>,
        message: &str,
    ) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, video_id, message)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, video_id, message, read, created_at
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Unread notifications for a user, newest first
    pub async fn list_unread(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, video_id, message, read, created_at
            FROM notifications
            WHERE user_id = $1 AND read = false
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Mark a notification read, scoped to the owning user.
    ///
    /// A notification belonging to someone else reports NotFound rather
    /// than Unauthorized, to avoid leaking existence.
    pub async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET read = true
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "Notification not found".to_string(),
            ));
        }

        Ok(())
    }
}
