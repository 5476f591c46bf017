//! HTTP handlers for the caller's notification inbox
use actix_web::{web, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::UserId;
use crate::services::InteractionService;

/// Unread notifications for the caller, newest first
///
/// GET /api/v1/notifications/unread
pub async fn list_unread(
    service: web::Data<Arc<InteractionService>>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let notifications = service.list_unread_notifications(user_id.0).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "notifications": notifications })))
}

/// Mark one of the caller's notifications as read
///
/// POST /api/v1/notifications/{id}/read
pub async fn mark_read(
    service: web::Data<Arc<InteractionService>>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let notification_id = path.into_inner();
    service
        .mark_notification_read(notification_id, user_id.0)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Notification marked as read" })))
}

/// Register routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .route("/unread", web::get().to(list_unread))
            .route("/{id}/read", web::post().to(mark_read)),
    );
}
