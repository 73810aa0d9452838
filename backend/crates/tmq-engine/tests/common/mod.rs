#![allow(dead_code)]

pub mod fake_broker;

pub use fake_broker::FakeBroker;

use tmq_core::{Clock, ManualClock, Namespace, PermissionTemplates};
use tmq_db::{AlertRepository, NamespaceRepository, NamespaceStore};
use tmq_engine::{
    AlertEvent, AlertSink, EngineResult, EngineSettings, Metrics, MonitorSettings,
    NamespaceSettings, Scheduler, SchedulerSettings,
};

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

pub const TEMPLATE: &str = "^(queue/{{namespace}}/.*|exchange/{{namespace}}/.*)";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// Rotation every hour, 24h grace, alert at 100 and delete at 1000
/// messages, orphans deleted after 1h, alerts suppressed for 24h.
pub fn engine_settings() -> EngineSettings {
    EngineSettings {
        namespaces: NamespaceSettings {
            prefix: String::from("tc-"),
            vhost: String::from("/"),
            admin_username: String::from("admin"),
            rotation_interval: Duration::hours(1),
            expiration_delay: Duration::hours(24),
            templates: PermissionTemplates::new(TEMPLATE, TEMPLATE, TEMPLATE).unwrap(),
            user_tags: vec![String::from("management")],
        },
        monitor: MonitorSettings {
            vhost: String::from("/"),
            namespace_prefix: String::from("tc-"),
            queue_prefix: String::from("queue/"),
            exchange_prefix: String::from("exchange/"),
            alert_threshold: 100,
            delete_threshold: 1000,
            connection_max_lifetime: Duration::hours(1),
            message_count_tolerance: 0,
            message_publish_rate_tolerance: 0.0,
            queue_expiration_delay: Duration::hours(24),
        },
        scheduler: SchedulerSettings {
            iteration_length: StdDuration::from_secs(2),
            iteration_gap: StdDuration::ZERO,
            iteration_failures: 3,
            max_concurrency: 4,
            operation_timeout: StdDuration::from_secs(1),
        },
    }
}

/// Alert sink that keeps every event it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AlertEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<AlertEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn deliver(&self, event: &AlertEvent) -> EngineResult<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// A scheduler over an in-memory store, a fake broker and a manual clock
/// starting at `t0()`.
pub struct Harness {
    pub scheduler: Scheduler,
    pub store: Arc<NamespaceRepository>,
    pub alerts: Arc<AlertRepository>,
    pub broker: Arc<FakeBroker>,
    pub sink: Arc<RecordingSink>,
    pub clock: ManualClock,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_settings(engine_settings()).await
    }

    pub async fn with_settings(settings: EngineSettings) -> Self {
        let pool = tmq_db::open_in_memory()
            .await
            .expect("Failed to create test pool");
        let store = Arc::new(NamespaceRepository::new(pool.clone()));
        let alerts = Arc::new(AlertRepository::new(pool));
        let broker = Arc::new(FakeBroker::new());
        let sink = Arc::new(RecordingSink::default());
        let clock = ManualClock::new(t0());
        let engine_clock: Arc<dyn Clock> = Arc::new(clock.clone());

        let scheduler = Scheduler::new(
            store.clone(),
            alerts.clone(),
            broker.clone(),
            sink.clone(),
            engine_clock,
            settings,
            Metrics::new(),
        );

        Self {
            scheduler,
            store,
            alerts,
            broker,
            sink,
            clock,
        }
    }

    /// Insert `name` created now and expiring after `lifetime`.
    pub async fn add_namespace(&self, name: &str, lifetime: Duration) -> Namespace {
        let now = self.clock.now();
        let namespace = Namespace::new(name, now, now + lifetime, None).unwrap();
        self.store.insert(&namespace).await.unwrap();
        namespace
    }

    pub async fn namespace(&self, name: &str) -> Option<Namespace> {
        self.store.get(name).await.unwrap()
    }
}
