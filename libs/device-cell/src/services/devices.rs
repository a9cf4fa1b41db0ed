use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::PostgrestClient;

use crate::models::{CreateDeviceDataRequest, DeviceData, DeviceError};

pub struct DeviceDataService {
    client: PostgrestClient,
}

impl DeviceDataService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: PostgrestClient::new(config),
        }
    }

    pub async fn add_device_data(
        &self,
        user_id: Uuid,
        request: CreateDeviceDataRequest,
    ) -> Result<DeviceData, DeviceError> {
        debug!(
            "Storing {} readings for user {}",
            request.device_type, user_id
        );

        let recorded_at = request.recorded_at.unwrap_or_else(Utc::now);
        let body = json!({
            "user_id": user_id,
            "device_type": request.device_type,
            "readings": request.readings,
            "recorded_at": recorded_at.to_rfc3339(),
        });

        let rows: Vec<DeviceData> = self
            .client
            .request_returning(Method::POST, "/rest/v1/device_data", Some(body))
            .await
            .map_err(|e| DeviceError::Database(e.to_string()))?;

        rows.into_iter()
            .next()
            .ok_or_else(|| DeviceError::Database("Insert returned no device row".to_string()))
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<DeviceData>, DeviceError> {
        let path = format!(
            "/rest/v1/device_data?user_id=eq.{}&order=recorded_at.desc",
            user_id
        );
        let rows = self
            .client
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DeviceError::Database(e.to_string()))?;
        Ok(rows)
    }
}
