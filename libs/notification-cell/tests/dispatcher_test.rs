use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::extract::ws::Message;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use uuid::Uuid;

use notification_cell::models::{NewNotification, Notification};
use notification_cell::registry::{ConnectionRegistry, LiveConnection};
use notification_cell::store::NotificationStore;
use notification_cell::NotificationDispatcher;

/// In-memory store double so dispatcher behavior is observable per test.
#[derive(Default)]
struct MemoryStore {
    rows: Mutex<Vec<Notification>>,
    fail_creates: bool,
}

impl MemoryStore {
    fn failing() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            fail_creates: true,
        }
    }

    fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create(&self, new: NewNotification) -> Result<Notification> {
        if self.fail_creates {
            return Err(anyhow!("store offline"));
        }
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            message: new.message,
            kind: new.kind,
            read: false,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(notification.clone());
        Ok(notification)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let rows = self.rows.lock().unwrap();
        let mut matching: Vec<Notification> = rows
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        matching.reverse();
        Ok(matching)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>> {
        let mut rows = self.rows.lock().unwrap();
        for row in rows.iter_mut() {
            if row.id == id && row.user_id == user_id {
                row.read = true;
                return Ok(Some(row.clone()));
            }
        }
        Ok(None)
    }
}

fn live_connection() -> (LiveConnection, UnboundedReceiver<Message>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (LiveConnection::new(Uuid::new_v4(), tx), rx)
}

fn drain_pushes(rx: &mut UnboundedReceiver<Message>) -> Vec<Value> {
    let mut frames = Vec::new();
    while let Ok(Message::Text(text)) = rx.try_recv() {
        frames.push(serde_json::from_str(&text).unwrap());
    }
    frames
}

#[tokio::test]
async fn test_notify_registered_user_pushes_once_and_persists_once() {
    let store = Arc::new(MemoryStore::default());
    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = NotificationDispatcher::new(store.clone(), registry.clone());

    let doctor = Uuid::new_v4();
    let appointment = Uuid::new_v4();
    let (conn, mut rx) = live_connection();
    registry.register(doctor, conn).await;

    dispatcher
        .notify(doctor, "m", "appointment_created", appointment)
        .await;

    let pushes = drain_pushes(&mut rx);
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0]["type"], "appointment_created");
    assert_eq!(pushes[0]["related_entity_id"], appointment.to_string());
    assert_eq!(pushes[0]["message"], "m");

    let rows = store.list_for_user(doctor).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].message, "m");
    assert_eq!(rows[0].kind, "appointment_created");
    assert!(!rows[0].read);
}

#[tokio::test]
async fn test_notify_unregistered_user_persists_row_only() {
    let store = Arc::new(MemoryStore::default());
    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = NotificationDispatcher::new(store.clone(), registry.clone());

    let patient = Uuid::new_v4();
    dispatcher
        .notify(patient, "m", "record_uploaded", Uuid::new_v4())
        .await;

    assert_eq!(store.row_count(), 1);
    let rows = store.list_for_user(patient).await.unwrap();
    assert!(!rows[0].read);
}

#[tokio::test]
async fn test_store_failure_does_not_propagate_and_push_still_happens() {
    let store = Arc::new(MemoryStore::failing());
    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = NotificationDispatcher::new(store.clone(), registry.clone());

    let user = Uuid::new_v4();
    let (conn, mut rx) = live_connection();
    registry.register(user, conn).await;

    // Must complete normally; the loss is logged, not surfaced.
    dispatcher.notify(user, "m", "t", Uuid::new_v4()).await;

    assert_eq!(store.row_count(), 0);
    assert_eq!(drain_pushes(&mut rx).len(), 1);
}

#[tokio::test]
async fn test_push_transport_failure_is_swallowed() {
    let store = Arc::new(MemoryStore::default());
    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = NotificationDispatcher::new(store.clone(), registry.clone());

    let user = Uuid::new_v4();
    let (conn, rx) = live_connection();
    registry.register(user, conn).await;
    // Receiver gone: the send side now errors like a torn socket.
    drop(rx);

    dispatcher.notify(user, "m", "t", Uuid::new_v4()).await;

    // The durable row is still the fallback delivery mechanism.
    assert_eq!(store.row_count(), 1);
}

#[tokio::test]
async fn test_disconnect_then_notify_leaves_second_row_and_no_push() {
    let store = Arc::new(MemoryStore::default());
    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = NotificationDispatcher::new(store.clone(), registry.clone());

    let doctor = Uuid::new_v4();
    let connection_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::unbounded_channel();
    registry
        .register(doctor, LiveConnection::new(connection_id, tx))
        .await;

    dispatcher
        .notify(doctor, "first", "appointment_created", Uuid::new_v4())
        .await;
    assert_eq!(drain_pushes(&mut rx).len(), 1);

    registry.unregister(connection_id).await;

    dispatcher
        .notify(doctor, "second", "appointment_created", Uuid::new_v4())
        .await;
    assert_eq!(drain_pushes(&mut rx).len(), 0);

    let rows = store.list_for_user(doctor).await.unwrap();
    assert_eq!(rows.len(), 2);
    // Newest first.
    assert_eq!(rows[0].message, "second");
    assert_eq!(rows[1].message, "first");
}

#[tokio::test]
async fn test_mark_read_is_idempotent() {
    let store = MemoryStore::default();
    let user = Uuid::new_v4();
    let created = store
        .create(NewNotification {
            user_id: user,
            message: "m".to_string(),
            kind: "t".to_string(),
        })
        .await
        .unwrap();
    assert!(!created.read);

    let first = store.mark_read(created.id, user).await.unwrap().unwrap();
    assert!(first.read);

    let second = store.mark_read(created.id, user).await.unwrap().unwrap();
    assert!(second.read);
}

#[tokio::test]
async fn test_mark_read_scoped_to_owner() {
    let store = MemoryStore::default();
    let owner = Uuid::new_v4();
    let created = store
        .create(NewNotification {
            user_id: owner,
            message: "m".to_string(),
            kind: "t".to_string(),
        })
        .await
        .unwrap();

    let other = Uuid::new_v4();
    assert!(store.mark_read(created.id, other).await.unwrap().is_none());

    let rows = store.list_for_user(owner).await.unwrap();
    assert!(!rows[0].read);
}
