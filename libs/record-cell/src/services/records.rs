use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::PostgrestClient;

use crate::models::{CreateHealthRecordRequest, HealthRecord, RecordError, UpdateHealthRecordRequest};

pub struct HealthRecordService {
    client: PostgrestClient,
}

impl HealthRecordService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: PostgrestClient::new(config),
        }
    }

    pub async fn create_record(
        &self,
        request: CreateHealthRecordRequest,
    ) -> Result<HealthRecord, RecordError> {
        debug!(
            "Creating {} record for patient {}",
            request.record_type, request.patient_id
        );

        let body = json!({
            "patient_id": request.patient_id,
            "record_type": request.record_type,
            "data": request.data,
            "recorded_at": request.recorded_at.to_rfc3339(),
        });

        let rows: Vec<HealthRecord> = self
            .client
            .request_returning(Method::POST, "/rest/v1/health_records", Some(body))
            .await
            .map_err(|e| RecordError::Database(e.to_string()))?;

        rows.into_iter()
            .next()
            .ok_or_else(|| RecordError::Database("Insert returned no record row".to_string()))
    }

    pub async fn list_records(&self) -> Result<Vec<HealthRecord>, RecordError> {
        let rows = self
            .client
            .request(
                Method::GET,
                "/rest/v1/health_records?order=recorded_at.desc",
                None,
            )
            .await
            .map_err(|e| RecordError::Database(e.to_string()))?;
        Ok(rows)
    }

    pub async fn get_record(&self, id: Uuid) -> Result<HealthRecord, RecordError> {
        let path = format!("/rest/v1/health_records?id=eq.{}", id);
        let rows: Vec<HealthRecord> = self
            .client
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| RecordError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(RecordError::NotFound)
    }

    pub async fn update_record(
        &self,
        id: Uuid,
        request: UpdateHealthRecordRequest,
    ) -> Result<HealthRecord, RecordError> {
        if request.is_empty() {
            return Err(RecordError::Validation("No fields to update".to_string()));
        }

        let mut patch = Map::new();
        if let Some(record_type) = request.record_type {
            patch.insert("record_type".to_string(), json!(record_type));
        }
        if let Some(data) = request.data {
            patch.insert("data".to_string(), data);
        }
        if let Some(recorded_at) = request.recorded_at {
            patch.insert("recorded_at".to_string(), json!(recorded_at.to_rfc3339()));
        }
        patch.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/health_records?id=eq.{}", id);
        let rows: Vec<HealthRecord> = self
            .client
            .request_returning(Method::PATCH, &path, Some(Value::Object(patch)))
            .await
            .map_err(|e| RecordError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(RecordError::NotFound)
    }

    pub async fn delete_record(&self, id: Uuid) -> Result<(), RecordError> {
        let path = format!("/rest/v1/health_records?id=eq.{}", id);
        let rows: Vec<Value> = self
            .client
            .request_returning(Method::DELETE, &path, None)
            .await
            .map_err(|e| RecordError::Database(e.to_string()))?;

        if rows.is_empty() {
            return Err(RecordError::NotFound);
        }
        Ok(())
    }
}
