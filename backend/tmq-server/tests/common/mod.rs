#![allow(dead_code)]

use tmq_server::AppState;

use tmq_broker::HttpBrokerAdmin;
use tmq_config::Config;
use tmq_core::{Clock, SystemClock};
use tmq_db::{AlertRepository, NamespaceRepository};
use tmq_engine::{EngineSettings, LogAlertSink, Metrics, Scheduler};

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;

/// AppState over an in-memory store and a broker client that is never called.
pub async fn create_test_app_state() -> AppState {
    let pool = tmq_db::open_in_memory()
        .await
        .expect("Failed to create test database");
    let broker = HttpBrokerAdmin::new(
        "http://127.0.0.1:9",
        "admin",
        "secret",
        Duration::from_secs(1),
        10,
    )
    .expect("Failed to create broker client");
    let settings =
        EngineSettings::from_config(&Config::default()).expect("Default config is valid");
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let scheduler = Scheduler::new(
        Arc::new(NamespaceRepository::new(pool.clone())),
        Arc::new(AlertRepository::new(pool)),
        Arc::new(broker),
        Arc::new(LogAlertSink),
        clock,
        settings,
        Metrics::new(),
    );

    AppState {
        scheduler,
        metrics: PrometheusBuilder::new().build_recorder().handle(),
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
