use tmq_engine::Scheduler;

use metrics_exporter_prometheus::PrometheusHandle;

/// Shared state for the operator HTTP endpoints.
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Scheduler,
    pub metrics: PrometheusHandle,
}
