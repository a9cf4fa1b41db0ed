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

use crate::models::{AppointmentError, CreateAppointmentRequest, UpdateAppointmentRequest};
use crate::services::AppointmentService;

#[derive(Clone)]
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub dispatcher: Arc<NotificationDispatcher>,
}

fn map_error(error: AppointmentError) -> AppError {
    match error {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
        AppointmentError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        mismatch @ AppointmentError::RoleMismatch { .. } => {
            AppError::BadRequest(mismatch.to_string())
        }
        AppointmentError::Validation(msg) => AppError::BadRequest(msg),
        AppointmentError::Database(msg) => AppError::Database(msg),
    }
}

/// POST / — create an appointment, then tell the doctor about it. The
/// notification is a side channel: once the insert has committed, nothing
/// about it may change this handler's response.
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<AppointmentState>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if request.reason.trim().is_empty() {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let service = AppointmentService::new(&state.config);
    let appointment = service.create_appointment(request).await.map_err(map_error)?;

    let message = format!(
        "New appointment scheduled for {}",
        appointment.scheduled_at.to_rfc3339()
    );
    state
        .dispatcher
        .notify(
            appointment.doctor_id,
            &message,
            "appointment_created",
            appointment.id,
        )
        .await;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppointmentState>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state.config);
    let appointments = service.list_appointments().await.map_err(map_error)?;
    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state.config);
    let appointment = service
        .get_appointment(appointment_id)
        .await
        .map_err(map_error)?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state.config);
    let appointment = service
        .update_appointment(appointment_id, request)
        .await
        .map_err(map_error)?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state.config);
    service
        .delete_appointment(appointment_id)
        .await
        .map_err(map_error)?;
    Ok(Json(json!({ "message": "Appointment deleted" })))
}
