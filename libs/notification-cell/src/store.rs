use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::PostgrestClient;

use crate::models::{NewNotification, Notification};

/// Persistence seam for notification rows.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, new: NewNotification) -> Result<Notification>;

    /// All rows for one user, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>>;

    /// Flip the read flag on one row owned by `user_id`. Returns the updated
    /// row, or None when no such row exists. Safe to call repeatedly.
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>>;
}

pub struct PostgrestNotificationStore {
    client: PostgrestClient,
}

impl PostgrestNotificationStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: PostgrestClient::new(config),
        }
    }
}

#[async_trait]
impl NotificationStore for PostgrestNotificationStore {
    async fn create(&self, new: NewNotification) -> Result<Notification> {
        let body = json!({
            "user_id": new.user_id,
            "message": new.message,
            "kind": new.kind,
            "read": false,
        });

        let rows: Vec<Notification> = self
            .client
            .request_returning(Method::POST, "/rest/v1/notifications", Some(body))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Insert returned no notification row"))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let path = format!(
            "/rest/v1/notifications?user_id=eq.{}&order=created_at.desc",
            user_id
        );
        let rows = self.client.request(Method::GET, &path, None).await?;
        Ok(rows)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>> {
        let path = format!("/rest/v1/notifications?id=eq.{}&user_id=eq.{}", id, user_id);
        let rows: Vec<Notification> = self
            .client
            .request_returning(Method::PATCH, &path, Some(json!({ "read": true })))
            .await?;
        Ok(rows.into_iter().next())
    }
}
