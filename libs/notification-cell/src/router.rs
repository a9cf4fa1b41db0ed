use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, NotificationState};
use crate::ws;

pub fn notification_routes(state: NotificationState) -> Router {
    let protected_routes = Router::new()
        .route("/", get(handlers::list_notifications))
        .route(
            "/{notification_id}/read",
            put(handlers::mark_notification_read),
        )
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}

/// Mounted at the root router so clients connect to plain `/ws`.
pub fn ws_routes(state: NotificationState) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_upgrade))
        .with_state(state)
}
