use crate::AppState;

use tmq_engine::BreakerState;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET /health - scheduler status; 503 once the tick breaker has tripped
pub async fn health_check(State(state): State<AppState>) -> Response {
    let health = state.scheduler.health();

    let (status, label) = match health.breaker {
        BreakerState::Closed => (StatusCode::OK, "healthy"),
        BreakerState::Tripped => (StatusCode::SERVICE_UNAVAILABLE, "tripped"),
    };

    let body = json!({
        "status": label,
        "version": env!("CARGO_PKG_VERSION"),
        "scheduler": health,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status, Json(body)).into_response()
}

/// GET /live - the process is up and serving
pub async fn liveness_check() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
        .into_response()
}
