use axum::extract::ws::Message;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use uuid::Uuid;

use notification_cell::models::PushEvent;
use notification_cell::registry::{ConnectionRegistry, LiveConnection};

fn connection(id: Uuid) -> (LiveConnection, UnboundedReceiver<Message>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (LiveConnection::new(id, tx), rx)
}

fn event(message: &str) -> PushEvent {
    PushEvent {
        kind: "test".to_string(),
        related_entity_id: Uuid::new_v4(),
        message: message.to_string(),
    }
}

fn recv_text(rx: &mut UnboundedReceiver<Message>) -> Option<String> {
    match rx.try_recv() {
        Ok(Message::Text(text)) => Some(text.to_string()),
        _ => None,
    }
}

#[tokio::test]
async fn test_lookup_returns_most_recent_registration() {
    let registry = ConnectionRegistry::new();
    let user = Uuid::new_v4();

    assert!(registry.lookup(user).await.is_none());

    let first_id = Uuid::new_v4();
    let (first, _rx1) = connection(first_id);
    registry.register(user, first).await;
    assert_eq!(registry.lookup(user).await.unwrap().id(), first_id);

    let second_id = Uuid::new_v4();
    let (second, _rx2) = connection(second_id);
    registry.register(user, second).await;
    assert_eq!(registry.lookup(user).await.unwrap().id(), second_id);
}

#[tokio::test]
async fn test_reregistration_orphans_previous_connection() {
    // A second browser tab replaces the first binding; the first tab
    // silently stops receiving pushes.
    let registry = ConnectionRegistry::new();
    let user = Uuid::new_v4();

    let (first, mut rx1) = connection(Uuid::new_v4());
    registry.register(user, first).await;

    let (second, mut rx2) = connection(Uuid::new_v4());
    registry.register(user, second).await;

    let bound = registry.lookup(user).await.unwrap();
    bound.push(&event("hello")).unwrap();

    assert!(recv_text(&mut rx2).is_some());
    assert!(recv_text(&mut rx1).is_none());
}

#[tokio::test]
async fn test_unregister_unknown_connection_is_noop() {
    let registry = ConnectionRegistry::new();
    let user = Uuid::new_v4();

    let connection_id = Uuid::new_v4();
    let (conn, _rx) = connection(connection_id);
    registry.register(user, conn).await;

    registry.unregister(Uuid::new_v4()).await;

    assert_eq!(registry.lookup(user).await.unwrap().id(), connection_id);
}

#[tokio::test]
async fn test_unregister_removes_only_matching_binding() {
    let registry = ConnectionRegistry::new();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let alice_conn_id = Uuid::new_v4();
    let (alice_conn, _rx1) = connection(alice_conn_id);
    registry.register(alice, alice_conn).await;

    let bob_conn_id = Uuid::new_v4();
    let (bob_conn, _rx2) = connection(bob_conn_id);
    registry.register(bob, bob_conn).await;

    registry.unregister(alice_conn_id).await;

    assert!(registry.lookup(alice).await.is_none());
    assert_eq!(registry.lookup(bob).await.unwrap().id(), bob_conn_id);
    assert_eq!(registry.connected_count().await, 1);
}

#[tokio::test]
async fn test_stale_unregister_does_not_drop_new_binding() {
    // The old connection's disconnect may arrive after the user has already
    // re-registered; unbinding by connection id keeps the new binding alive.
    let registry = ConnectionRegistry::new();
    let user = Uuid::new_v4();

    let old_id = Uuid::new_v4();
    let (old, _rx1) = connection(old_id);
    registry.register(user, old).await;

    let new_id = Uuid::new_v4();
    let (new, _rx2) = connection(new_id);
    registry.register(user, new).await;

    registry.unregister(old_id).await;

    assert_eq!(registry.lookup(user).await.unwrap().id(), new_id);
}

#[tokio::test]
async fn test_full_binding_lifecycle() {
    // unbound -> register(C1) -> bound(C1) -> register(C2) -> bound(C2)
    // -> unregister(C2) -> unbound
    let registry = ConnectionRegistry::new();
    let user = Uuid::new_v4();

    assert!(registry.lookup(user).await.is_none());

    let c1 = Uuid::new_v4();
    let (conn1, _rx1) = connection(c1);
    registry.register(user, conn1).await;
    assert_eq!(registry.lookup(user).await.unwrap().id(), c1);

    let c2 = Uuid::new_v4();
    let (conn2, _rx2) = connection(c2);
    registry.register(user, conn2).await;
    assert_eq!(registry.lookup(user).await.unwrap().id(), c2);

    registry.unregister(c2).await;
    assert!(registry.lookup(user).await.is_none());
    assert_eq!(registry.connected_count().await, 0);
}
