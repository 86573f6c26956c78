//! Health check handler.

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let metrics = state.hub.metrics();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        subscribers: metrics.subscribers_active,
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        broadcasts: metrics.broadcasts,
        dropped: metrics.dropped,
    })
}
