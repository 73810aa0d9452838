use crate::{AppState, health};

use axum::{Router, routing::get};

/// Build the operator router: health, liveness and Prometheus metrics
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route("/metrics", get(health::metrics))
        .with_state(state)
}
