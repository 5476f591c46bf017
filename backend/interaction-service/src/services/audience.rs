use crate::error::Result;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

/// Resolves the set of users eligible for a notification about a video.
///
/// The audience is everyone who holds a like or a comment on the video,
/// minus the acting user. Runs outside any write transaction; a slightly
/// stale read is acceptable for notification targeting.
#[derive(Clone)]
pub struct AudienceResolver {
    pool: PgPool,
}

impl AudienceResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinct prior interactors on a video, excluding the actor
    pub async fn resolve(&self, video_id: Uuid, exclude_user: Uuid) -> Result<HashSet<Uuid>> {
        let user_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM likes WHERE video_id = $1 AND user_id <> $2
            UNION
            SELECT user_id FROM comments WHERE video_id = $1 AND user_id <> $2
            "#,
        )
        .bind(video_id)
        .bind(exclude_user)
        .fetch_all(&self.pool)
        .await?;

        Ok(Self::collect(user_ids, exclude_user))
    }

    /// Dedupe interactor rows and drop the actor. The query already
    /// excludes the actor; the filter holds the guarantee locally too.
    fn collect(user_ids: Vec<Uuid>, exclude_user: Uuid) -> HashSet<Uuid> {
        user_ids
            .into_iter()
            .filter(|id| *id != exclude_user)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audience_never_contains_the_actor() {
        let actor = Uuid::new_v4();
        let other = Uuid::new_v4();

        let audience = AudienceResolver::collect(vec![actor, other], actor);

        assert_eq!(audience.len(), 1);
        assert!(audience.contains(&other));
    }

    #[test]
    fn liker_who_also_commented_appears_once() {
        let interactor = Uuid::new_v4();

        let audience =
            AudienceResolver::collect(vec![interactor, interactor], Uuid::new_v4());

        assert_eq!(audience.len(), 1);
    }

    #[test]
    fn actor_alone_yields_empty_audience() {
        let actor = Uuid::new_v4();

        let audience = AudienceResolver::collect(vec![actor], actor);

        assert!(audience.is_empty());
    }
}
