use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::registry::ConnectionRegistry;
use crate::store::NotificationStore;

/// Shared state for the notification routes and the live channel.
#[derive(Clone)]
pub struct NotificationState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<ConnectionRegistry>,
    pub store: Arc<dyn NotificationStore>,
}

fn caller_id(user: &AuthUser) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id)
        .map_err(|_| AppError::BadRequest("Invalid user ID format".to_string()))
}

/// GET / — the caller's notifications, newest first.
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<NotificationState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let user_id = caller_id(&user)?;
    debug!("Fetching notifications for user {}", user_id);

    let notifications = state
        .store
        .list_for_user(user_id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(notifications)))
}

/// PUT /{notification_id}/read — flip the read flag on one of the caller's
/// rows. Repeating the call succeeds and changes nothing.
#[axum::debug_handler]
pub async fn mark_notification_read(
    State(state): State<NotificationState>,
    Path(notification_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let user_id = caller_id(&user)?;

    let updated = state
        .store
        .mark_read(notification_id, user_id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    match updated {
        Some(notification) => Ok(Json(json!(notification))),
        None => Err(AppError::NotFound("Notification not found".to_string())),
    }
}
