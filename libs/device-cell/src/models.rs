use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One batch of readings reported by a wearable or home device. Readings are
/// opaque JSON; shape varies per device type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceData {
    pub id: Uuid,
    pub user_id: Uuid,
    pub device_type: String,
    pub readings: Value,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeviceDataRequest {
    pub device_type: String,
    pub readings: Value,
    pub recorded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}
