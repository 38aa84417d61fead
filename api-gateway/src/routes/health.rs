use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Serialize;

use crate::state::SharedState;

/// Simple health-check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Height of the canonical tip, if bootstrapped.
    pub best_height: Option<u64>,
}

/// `GET /health`
///
/// Returns a basic JSON document indicating liveness.
pub async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    let best_height = state.manager.best_block().map(|b| b.height);
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            best_height,
        }),
    )
}

/// `GET /metrics`
///
/// Same text exposition as the standalone exporter, served on the API port.
pub async fn metrics(State(state): State<SharedState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.gather_text(),
    )
}
