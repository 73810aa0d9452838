use crate::EngineResult;

use tmq_core::AlertKey;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use serde::Serialize;

/// An alert the engine decided to send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    pub key: AlertKey,
    pub contact: Option<String>,
    pub message_count: u64,
    pub rate: Option<f64>,
    pub alert_threshold: u64,
    pub delete_threshold: u64,
    pub observed_at: DateTime<Utc>,
}

/// Delivery of alerts to people. The engine only decides when to alert.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, event: &AlertEvent) -> EngineResult<()>;
}

/// Writes each alert as a `warn!` line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

#[async_trait]
impl AlertSink for LogAlertSink {
    async fn deliver(&self, event: &AlertEvent) -> EngineResult<()> {
        warn!(
            "ALERT queue {} of namespace {} holds {} messages (alert at {}, deleted at {}), rate {}, contact {}",
            event.key.queue_name,
            event.key.namespace,
            event.message_count,
            event.alert_threshold,
            event.delete_threshold,
            event
                .rate
                .map(|r| format!("{:.2}/s", r))
                .unwrap_or_else(|| String::from("n/a")),
            event.contact.as_deref().unwrap_or("none"),
        );
        Ok(())
    }
}
