use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::auth::Caller;
use crate::error::ApiError;
use crate::models::{MessageResponse, NotificationRequest, NotificationsResponse, SendNotificationResponse};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/notifications", web::get().to(list_notifications))
        .route("/notifications", web::post().to(send_notification))
        .route("/notifications/{id}", web::delete().to(delete_notification));
}

async fn list_notifications(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let notifications = state.store.list_notifications().await?;
    Ok(HttpResponse::Ok().json(NotificationsResponse { notifications }))
}

async fn send_notification(
    state: web::Data<AppState>,
    req: web::Json<NotificationRequest>,
) -> Result<HttpResponse, ApiError> {
    let all_fields_required = || ApiError::BadRequest("All fields are required".into());

    req.validate().map_err(|_| all_fields_required())?;
    let draft = req.into_inner().into_draft().ok_or_else(all_fields_required)?;

    let notification = state.store.send_notification(&draft).await?;
    tracing::info!("Sent {} notification {} for {}", draft.kind, notification.id, draft.event);

    // The response carries the full table, newest first
    let notifications = state.store.list_notifications().await?;

    Ok(HttpResponse::Ok().json(SendNotificationResponse {
        success: true,
        notifications,
    }))
}

async fn delete_notification(
    state: web::Data<AppState>,
    _caller: Caller,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    state
        .store
        .delete_notification(&path)
        .await
        .map_err(|e| ApiError::from_store(e, "Notification not found"))?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Notification deleted successfully".to_string(),
    }))
}
