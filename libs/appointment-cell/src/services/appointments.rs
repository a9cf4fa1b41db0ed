use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::PostgrestClient;
use shared_models::auth::UserRole;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, CreateAppointmentRequest,
    UpdateAppointmentRequest,
};

pub struct AppointmentService {
    client: PostgrestClient,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: PostgrestClient::new(config),
        }
    }

    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {}",
            request.patient_id, request.doctor_id
        );

        // Both references must resolve to users carrying the right role.
        self.verify_user_role(request.patient_id, UserRole::Patient)
            .await?;
        self.verify_user_role(request.doctor_id, UserRole::Doctor)
            .await?;

        let body = json!({
            "patient_id": request.patient_id,
            "doctor_id": request.doctor_id,
            "scheduled_at": request.scheduled_at.to_rfc3339(),
            "status": request.status.unwrap_or(AppointmentStatus::Scheduled),
            "reason": request.reason,
            "notes": request.notes,
        });

        let rows: Vec<Appointment> = self
            .client
            .request_returning(Method::POST, "/rest/v1/appointments", Some(body))
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or_else(|| {
            AppointmentError::Database("Insert returned no appointment row".to_string())
        })
    }

    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, AppointmentError> {
        let rows = self
            .client
            .request(
                Method::GET,
                "/rest/v1/appointments?order=scheduled_at.asc",
                None,
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;
        Ok(rows)
    }

    pub async fn get_appointment(&self, id: Uuid) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment {}", id);

        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let rows: Vec<Appointment> = self
            .client
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    pub async fn update_appointment(
        &self,
        id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        if request.is_empty() {
            return Err(AppointmentError::Validation(
                "No fields to update".to_string(),
            ));
        }

        let mut patch = Map::new();
        if let Some(scheduled_at) = request.scheduled_at {
            patch.insert("scheduled_at".to_string(), json!(scheduled_at.to_rfc3339()));
        }
        if let Some(status) = request.status {
            patch.insert("status".to_string(), json!(status));
        }
        if let Some(reason) = request.reason {
            patch.insert("reason".to_string(), json!(reason));
        }
        if let Some(notes) = request.notes {
            patch.insert("notes".to_string(), json!(notes));
        }
        patch.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let rows: Vec<Appointment> = self
            .client
            .request_returning(Method::PATCH, &path, Some(Value::Object(patch)))
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    pub async fn delete_appointment(&self, id: Uuid) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let rows: Vec<Value> = self
            .client
            .request_returning(Method::DELETE, &path, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        if rows.is_empty() {
            return Err(AppointmentError::NotFound);
        }
        Ok(())
    }

    async fn verify_user_role(
        &self,
        user_id: Uuid,
        expected: UserRole,
    ) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/users?id=eq.{}&select=id,role", user_id);
        let rows: Vec<Value> = self
            .client
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        let Some(row) = rows.first() else {
            return Err(match expected {
                UserRole::Patient => AppointmentError::PatientNotFound,
                _ => AppointmentError::DoctorNotFound,
            });
        };

        let role = row.get("role").and_then(Value::as_str).unwrap_or_default();
        if role != expected.as_str() {
            return Err(AppointmentError::RoleMismatch { user_id, expected });
        }

        Ok(())
    }
}
