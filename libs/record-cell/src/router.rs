use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use notification_cell::NotificationDispatcher;
use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, RecordState};

pub fn record_routes(config: Arc<AppConfig>, dispatcher: Arc<NotificationDispatcher>) -> Router {
    let state = RecordState {
        config: config.clone(),
        dispatcher,
    };

    let protected_routes = Router::new()
        .route("/", post(handlers::create_record))
        .route("/", get(handlers::list_records))
        .route("/{record_id}", get(handlers::get_record))
        .route("/{record_id}", put(handlers::update_record))
        .route("/{record_id}", delete(handlers::delete_record))
        .layer(middleware::from_fn_with_state(config, auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
