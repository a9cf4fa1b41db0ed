use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::models::{CreateDeviceDataRequest, DeviceError};
use crate::services::DeviceDataService;

fn map_error(error: DeviceError) -> AppError {
    match error {
        DeviceError::Validation(msg) => AppError::BadRequest(msg),
        DeviceError::Database(msg) => AppError::Database(msg),
    }
}

fn caller_id(user: &AuthUser) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id)
        .map_err(|_| AppError::BadRequest("Invalid user ID format".to_string()))
}

/// POST / — readings always land under the caller's own account.
#[axum::debug_handler]
pub async fn add_device_data(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateDeviceDataRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if request.device_type.trim().is_empty() {
        return Err(AppError::BadRequest(
            "deviceType and readings are required".to_string(),
        ));
    }

    let user_id = caller_id(&user)?;
    let service = DeviceDataService::new(&config);
    let data = service
        .add_device_data(user_id, request)
        .await
        .map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(json!(data))))
}

#[axum::debug_handler]
pub async fn get_device_data(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let user_id = caller_id(&user)?;
    let service = DeviceDataService::new(&config);
    let data = service.list_for_user(user_id).await.map_err(map_error)?;
    Ok(Json(json!(data)))
}
