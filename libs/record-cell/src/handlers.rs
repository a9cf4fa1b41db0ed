use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use notification_cell::NotificationDispatcher;
use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CreateHealthRecordRequest, RecordError, UpdateHealthRecordRequest};
use crate::services::HealthRecordService;

#[derive(Clone)]
pub struct RecordState {
    pub config: Arc<AppConfig>,
    pub dispatcher: Arc<NotificationDispatcher>,
}

fn map_error(error: RecordError) -> AppError {
    match error {
        RecordError::NotFound => AppError::NotFound("Record not found".to_string()),
        RecordError::Validation(msg) => AppError::BadRequest(msg),
        RecordError::Database(msg) => AppError::Database(msg),
    }
}

/// POST / — store a health record, then tell the patient a result landed.
#[axum::debug_handler]
pub async fn create_record(
    State(state): State<RecordState>,
    Json(request): Json<CreateHealthRecordRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if request.record_type.trim().is_empty() {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let service = HealthRecordService::new(&state.config);
    let record = service.create_record(request).await.map_err(map_error)?;

    let message = format!("New test result uploaded: {}", record.record_type);
    state
        .dispatcher
        .notify(record.patient_id, &message, "record_uploaded", record.id)
        .await;

    Ok((StatusCode::CREATED, Json(json!(record))))
}

#[axum::debug_handler]
pub async fn list_records(State(state): State<RecordState>) -> Result<Json<Value>, AppError> {
    let service = HealthRecordService::new(&state.config);
    let records = service.list_records().await.map_err(map_error)?;
    Ok(Json(json!(records)))
}

#[axum::debug_handler]
pub async fn get_record(
    State(state): State<RecordState>,
    Path(record_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = HealthRecordService::new(&state.config);
    let record = service.get_record(record_id).await.map_err(map_error)?;
    Ok(Json(json!(record)))
}

#[axum::debug_handler]
pub async fn update_record(
    State(state): State<RecordState>,
    Path(record_id): Path<Uuid>,
    Json(request): Json<UpdateHealthRecordRequest>,
) -> Result<Json<Value>, AppError> {
    let service = HealthRecordService::new(&state.config);
    let record = service
        .update_record(record_id, request)
        .await
        .map_err(map_error)?;
    Ok(Json(json!(record)))
}

#[axum::debug_handler]
pub async fn delete_record(
    State(state): State<RecordState>,
    Path(record_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = HealthRecordService::new(&state.config);
    service.delete_record(record_id).await.map_err(map_error)?;
    Ok(Json(json!({ "message": "Record deleted" })))
}
