use std::sync::Arc;

use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use device_cell::router::device_routes;
use notification_cell::router::{notification_routes, ws_routes};
use notification_cell::{
    ConnectionRegistry, NotificationDispatcher, NotificationState, PostgrestNotificationStore,
};
use record_cell::router::record_routes;
use shared_config::AppConfig;

pub fn create_router(
    config: Arc<AppConfig>,
    registry: Arc<ConnectionRegistry>,
    store: Arc<PostgrestNotificationStore>,
    dispatcher: Arc<NotificationDispatcher>,
) -> Router {
    let notification_state = NotificationState {
        config: config.clone(),
        registry,
        store,
    };

    Router::new()
        .route(
            "/",
            get(|| async { "Welcome to the HealthSync Healthcare System API!" }),
        )
        .route("/health", get(health_check))
        .nest("/auth", auth_routes(config.clone()))
        .nest(
            "/appointments",
            appointment_routes(config.clone(), dispatcher.clone()),
        )
        .nest("/records", record_routes(config.clone(), dispatcher))
        .nest("/devices", device_routes(config.clone()))
        .nest("/notifications", notification_routes(notification_state.clone()))
        .merge(ws_routes(notification_state))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339()
    }))
}
