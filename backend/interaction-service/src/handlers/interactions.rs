//! HTTP handlers for video interactions (likes, comments, views)
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::Comment;
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::InteractionService;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCommentPayload {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeResponse {
    pub liked: bool,
    pub total_like_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStateResponse {
    pub likes: i64,
    pub has_liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCountResponse {
    pub views: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub user_id: Uuid,
    pub is_user: bool,
}

impl CommentView {
    fn from_comment(comment: &Comment, viewer: Uuid) -> Self {
        Self {
            id: comment.id,
            content: comment.content.clone(),
            user_id: comment.user_id,
            is_user: comment.user_id == viewer,
        }
    }
}

/// Toggle the caller's like on a video
///
/// POST /api/v1/videos/{video_id}/like
pub async fn toggle_like(
    service: web::Data<Arc<InteractionService>>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    let outcome = service.toggle_like(video_id, user_id.0).await?;

    Ok(HttpResponse::Ok().json(ToggleLikeResponse {
        liked: outcome.liked,
        total_like_count: outcome.total_likes,
    }))
}

/// Remove the caller's like
///
/// DELETE /api/v1/videos/{video_id}/like
pub async fn delete_like(
    service: web::Data<Arc<InteractionService>>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    let total_like_count = service.delete_like(video_id, user_id.0).await?;

    Ok(HttpResponse::Ok().json(ToggleLikeResponse {
        liked: false,
        total_like_count,
    }))
}

/// Like count plus the caller's like state
///
/// GET /api/v1/videos/{video_id}/likes
pub async fn get_like_state(
    service: web::Data<Arc<InteractionService>>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    let (likes, has_liked) = service.get_like_state(video_id, user_id.0).await?;

    Ok(HttpResponse::Ok().json(LikeStateResponse { likes, has_liked }))
}

/// Add a comment to a video
///
/// POST /api/v1/videos/{video_id}/comments
pub async fn add_comment(
    service: web::Data<Arc<InteractionService>>,
    user_id: UserId,
    path: web::Path<Uuid>,
    payload: web::Json<AddCommentPayload>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    let comment = service
        .add_comment(video_id, user_id.0, &payload.content)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Comment added",
        "comment": CommentView::from_comment(&comment, user_id.0),
    })))
}

/// List comments for a video
///
/// GET /api/v1/videos/{video_id}/comments
pub async fn list_comments(
    service: web::Data<Arc<InteractionService>>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    let comments = service.list_comments(video_id).await?;

    let views: Vec<CommentView> = comments
        .iter()
        .map(|c| CommentView::from_comment(c, user_id.0))
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({ "comments": views })))
}

/// Delete the caller's own comment
///
/// DELETE /api/v1/videos/{video_id}/comments/{comment_id}
pub async fn delete_comment(
    service: web::Data<Arc<InteractionService>>,
    user_id: UserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (video_id, comment_id) = path.into_inner();
    service
        .delete_comment(comment_id, video_id, user_id.0)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Comment deleted" })))
}

/// Record one view
///
/// POST /api/v1/videos/{video_id}/views
pub async fn record_view(
    service: web::Data<Arc<InteractionService>>,
    _user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    let views = service.record_view(video_id).await?;

    Ok(HttpResponse::Ok().json(ViewCountResponse { views }))
}

/// Current view count
///
/// GET /api/v1/videos/{video_id}/views
pub async fn get_view_count(
    service: web::Data<Arc<InteractionService>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    let video = service.get_video(video_id).await?;

    Ok(HttpResponse::Ok().json(ViewCountResponse {
        views: video.total_view_count,
    }))
}

/// Register routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/videos")
            .route("/{video_id}/like", web::post().to(toggle_like))
            .route("/{video_id}/like", web::delete().to(delete_like))
            .route("/{video_id}/likes", web::get().to(get_like_state))
            .route("/{video_id}/comments", web::post().to(add_comment))
            .route("/{video_id}/comments", web::get().to(list_comments))
            .route(
                "/{video_id}/comments/{comment_id}",
                web::delete().to(delete_comment),
            )
            .route("/{video_id}/views", web::post().to(record_view))
            .route("/{video_id}/views", web::get().to(get_view_count)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn toggle_like_response_uses_wire_casing() {
        let resp = ToggleLikeResponse {
            liked: true,
            total_like_count: 3,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["liked"], true);
        assert_eq!(json["totalLikeCount"], 3);
    }

    #[test]
    fn like_state_response_uses_wire_casing() {
        let resp = LikeStateResponse {
            likes: 2,
            has_liked: false,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["likes"], 2);
        assert_eq!(json["hasLiked"], false);
    }

    #[test]
    fn comment_view_marks_own_comments() {
        let viewer = Uuid::new_v4();
        let comment = Comment {
            id: Uuid::new_v4(),
            video_id: Uuid::new_v4(),
            user_id: viewer,
            content: "nice".to_string(),
            created_at: Utc::now(),
        };
        let view = CommentView::from_comment(&comment, viewer);
        assert!(view.is_user);

        let other = CommentView::from_comment(&comment, Uuid::new_v4());
        assert!(!other.is_user);
    }
}
