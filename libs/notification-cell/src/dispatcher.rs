use std::sync::Arc;

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::models::{NewNotification, PushEvent};
use crate::registry::ConnectionRegistry;
use crate::store::NotificationStore;

/// Durably records a notification and best-effort pushes it to the target's
/// live connection. Invoked inline from whichever mutation needs to notify
/// someone, after that mutation's own write has committed; neither step may
/// fail the caller.
pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    registry: Arc<ConnectionRegistry>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn NotificationStore>, registry: Arc<ConnectionRegistry>) -> Self {
        Self { store, registry }
    }

    pub async fn notify(
        &self,
        target_user_id: Uuid,
        message: &str,
        kind: &str,
        related_entity_id: Uuid,
    ) {
        let new = NewNotification {
            user_id: target_user_id,
            message: message.to_string(),
            kind: kind.to_string(),
        };

        match self.store.create(new).await {
            Ok(notification) => {
                debug!(
                    "Persisted notification {} for user {}",
                    notification.id, target_user_id
                );
            }
            Err(e) => {
                // The primary mutation already committed; losing the row must
                // not surface to its caller.
                error!(
                    "Failed to persist notification for user {}: {}",
                    target_user_id, e
                );
            }
        }

        let Some(connection) = self.registry.lookup(target_user_id).await else {
            debug!("No live connection for user {}, row only", target_user_id);
            return;
        };

        let event = PushEvent {
            kind: kind.to_string(),
            related_entity_id,
            message: message.to_string(),
        };

        debug!(
            "Pushing {} event to user {} on connection {}",
            kind,
            target_user_id,
            connection.id()
        );
        if let Err(e) = connection.push(&event) {
            // Fire-and-forget: the row is the durable record the client can
            // fetch on its next poll.
            warn!("Push to user {} failed: {}", target_user_id, e);
        }
    }
}
