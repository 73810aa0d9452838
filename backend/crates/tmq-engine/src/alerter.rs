use crate::{EngineResult, Metrics};

use tmq_core::{AlertKey, Clock, QueueClassification};
use tmq_db::AlertStore;

use std::sync::Arc;

use chrono::Duration;
use log::debug;

/// Deduplicating alert gate: at most one alert per key per suppression
/// window, across concurrent scans and processes sharing the store.
pub struct Alerter {
    store: Arc<dyn AlertStore>,
    clock: Arc<dyn Clock>,
    suppression: Duration,
    metrics: Metrics,
}

impl Alerter {
    pub fn new(
        store: Arc<dyn AlertStore>,
        clock: Arc<dyn Clock>,
        suppression: Duration,
        metrics: Metrics,
    ) -> Self {
        Self {
            store,
            clock,
            suppression,
            metrics,
        }
    }

    /// True iff `classification` is `Alert` and no alert for `key` was
    /// recorded within the window. A `true` answer has already been
    /// persisted when this returns.
    pub async fn should_alert(
        &self,
        key: &AlertKey,
        classification: QueueClassification,
    ) -> EngineResult<bool> {
        if classification != QueueClassification::Alert {
            return Ok(false);
        }

        let fired = self
            .store
            .try_record_alert(key, self.clock.now(), self.suppression)
            .await?;

        if fired {
            self.metrics.alert_fired();
        } else {
            debug!("Alert for {} suppressed", key);
            self.metrics.alert_suppressed();
        }

        Ok(fired)
    }
}
