//! Route definitions for both listeners.
//!
//! Each router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor. Allow-lists are route layers, so unknown paths fall
//! through to 404 and other methods to 405 before any ACL check.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Router of the trigger listener: `POST /api/trigger`, `GET /api/health`.
pub fn build_trigger_router(state: AppState) -> Router {
    let trigger = post(handlers::trigger::trigger).route_layer(
        axum_middleware::from_fn_with_state(state.clone(), middleware::acl::require_trigger_acl),
    );

    Router::new()
        .route("/api/trigger", trigger)
        .merge(health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Router of the client listener: `GET /crmws`, `GET /api/health`.
pub fn build_client_router(state: AppState) -> Router {
    let crmws = get(handlers::ws::ws_upgrade).route_layer(
        axum_middleware::from_fn_with_state(state.clone(), middleware::acl::require_client_acl),
    );

    Router::new()
        .route("/crmws", crmws)
        .merge(health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/api/health", get(handlers::health::health))
}
