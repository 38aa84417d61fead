pub mod blocks;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::SharedState;

/// Builds the gateway router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics))
        .route("/head", get(blocks::head))
        .route("/blocks", post(blocks::submit_block))
        .route("/blocks/{hash}", get(blocks::get_block))
        .with_state(state)
}
