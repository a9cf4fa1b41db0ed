use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Lab result, measurement, or other clinical document attached to a
/// patient. `data` is free-form; this cell never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub record_type: String,
    pub data: Value,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHealthRecordRequest {
    pub patient_id: Uuid,
    pub record_type: String,
    pub data: Value,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHealthRecordRequest {
    pub record_type: Option<String>,
    pub data: Option<Value>,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl UpdateHealthRecordRequest {
    pub fn is_empty(&self) -> bool {
        self.record_type.is_none() && self.data.is_none() && self.recorded_at.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Record not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}
