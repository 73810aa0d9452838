//! Queue and exchange supervision.
//!
//! A scan takes one snapshot of the broker's queues and exchanges plus one
//! read of the namespace set, then classifies every resource the engine owns.
//! Anything whose name does not map to a managed namespace is left alone: the
//! virtual host is shared.

use crate::{EngineResult, Metrics, MonitorSettings};

use tmq_broker::BrokerAdmin;
use tmq_core::{AlertKey, Clock, Namespace, QueueClassification, QueueSnapshot, ResourceKind};
use tmq_db::NamespaceStore;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Serialize;

/// One classified queue or exchange from a scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueReport {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
    /// Always 0 for exchanges
    pub message_count: u64,
    /// Messages per second since the previous scan, if there was one
    pub rate: Option<f64>,
    /// No store record exists for `namespace`
    pub orphaned: bool,
    pub classification: QueueClassification,
}

impl QueueReport {
    pub fn alert_key(&self) -> AlertKey {
        AlertKey::new(&self.namespace, &self.name)
    }
}

/// Classification rules, in precedence order:
///
/// 1. orphaned for longer than `connection_max_lifetime`: `Delete`,
///    whatever the count; a younger orphan falls through to the depth checks
/// 2. `count >= delete_threshold`: `Delete`
/// 3. `count >= alert_threshold`: `Alert`, unless the queue has settled
///    (count within `message_count_tolerance` of the threshold and growing
///    no faster than `message_publish_rate_tolerance`)
/// 4. otherwise `Healthy`
pub fn classify(
    message_count: u64,
    rate: Option<f64>,
    orphaned_for: Option<Duration>,
    settings: &MonitorSettings,
) -> QueueClassification {
    if orphaned_for.is_some_and(|age| age > settings.connection_max_lifetime) {
        return QueueClassification::Delete;
    }

    if message_count >= settings.delete_threshold {
        return QueueClassification::Delete;
    }

    if message_count >= settings.alert_threshold {
        let within_count = message_count
            < settings
                .alert_threshold
                .saturating_add(settings.message_count_tolerance);
        let within_rate = rate.is_some_and(|r| r <= settings.message_publish_rate_tolerance);

        return if within_count && within_rate {
            QueueClassification::Healthy
        } else {
            QueueClassification::Alert
        };
    }

    QueueClassification::Healthy
}

#[derive(Default)]
struct MonitorState {
    snapshots: HashMap<String, QueueSnapshot>,
    orphaned_since: HashMap<(ResourceKind, String), DateTime<Utc>>,
}

pub struct QueueMonitor {
    broker: Arc<dyn BrokerAdmin>,
    store: Arc<dyn NamespaceStore>,
    clock: Arc<dyn Clock>,
    settings: MonitorSettings,
    metrics: Metrics,
    state: Mutex<MonitorState>,
}

impl QueueMonitor {
    pub fn new(
        broker: Arc<dyn BrokerAdmin>,
        store: Arc<dyn NamespaceStore>,
        clock: Arc<dyn Clock>,
        settings: MonitorSettings,
        metrics: Metrics,
    ) -> Self {
        Self {
            broker,
            store,
            clock,
            settings,
            metrics,
            state: Mutex::new(MonitorState::default()),
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub async fn scan(&self) -> EngineResult<Vec<QueueReport>> {
        let queues = self.broker.list_queues(&self.settings.vhost).await?;
        let exchanges = self.broker.list_exchanges(&self.settings.vhost).await?;
        let namespaces: HashSet<String> = self
            .store
            .list_all()
            .await?
            .into_iter()
            .map(|namespace: Namespace| namespace.name)
            .collect();
        let now = self.clock.now();

        let mut state = self.lock();
        let mut reports = Vec::new();
        let mut seen_queues = HashSet::new();
        let mut seen_orphans = HashSet::new();

        for queue in queues {
            let Some(namespace) = self.owner(&queue.name, &self.settings.queue_prefix) else {
                continue;
            };

            let snapshot = QueueSnapshot {
                queue_name: queue.name.clone(),
                namespace: namespace.clone(),
                message_count: queue.messages,
                observed_at: now,
            };
            let rate = state
                .snapshots
                .get(&queue.name)
                .and_then(|previous| snapshot.rate_since(previous));
            state.snapshots.insert(queue.name.clone(), snapshot);
            seen_queues.insert(queue.name.clone());

            let key = (ResourceKind::Queue, queue.name.clone());
            let orphaned_for = if namespaces.contains(&namespace) {
                None
            } else {
                seen_orphans.insert(key.clone());
                let since = *state.orphaned_since.entry(key).or_insert(now);
                Some(now - since)
            };

            reports.push(QueueReport {
                kind: ResourceKind::Queue,
                classification: classify(queue.messages, rate, orphaned_for, &self.settings),
                orphaned: orphaned_for.is_some(),
                name: queue.name,
                namespace,
                message_count: queue.messages,
                rate,
            });
        }

        for exchange in exchanges {
            let Some(namespace) = self.owner(&exchange.name, &self.settings.exchange_prefix) else {
                continue;
            };

            let key = (ResourceKind::Exchange, exchange.name.clone());
            let orphaned_for = if namespaces.contains(&namespace) {
                None
            } else {
                seen_orphans.insert(key.clone());
                let since = *state.orphaned_since.entry(key).or_insert(now);
                Some(now - since)
            };

            // Exchanges hold no messages; only orphan age can flag them.
            let classification = match orphaned_for {
                Some(_) => classify(0, None, orphaned_for, &self.settings),
                None => QueueClassification::Healthy,
            };

            reports.push(QueueReport {
                kind: ResourceKind::Exchange,
                classification,
                orphaned: orphaned_for.is_some(),
                name: exchange.name,
                namespace,
                message_count: 0,
                rate: None,
            });
        }

        state.snapshots.retain(|name, _| seen_queues.contains(name));
        state.orphaned_since.retain(|key, _| seen_orphans.contains(key));
        drop(state);

        for classification in [
            QueueClassification::Healthy,
            QueueClassification::Alert,
            QueueClassification::Delete,
        ] {
            let count = reports
                .iter()
                .filter(|r| r.classification == classification)
                .count();
            self.metrics.resources_classified(classification, count);
        }
        debug!("Scan classified {} managed resources", reports.len());

        Ok(reports)
    }

    /// Namespace owning `name`, if it is `<prefix><namespace>/...` with a
    /// valid namespace under the managed prefix.
    fn owner(&self, name: &str, resource_prefix: &str) -> Option<String> {
        let rest = name.strip_prefix(resource_prefix)?;
        let (namespace, _) = rest.split_once('/')?;

        if namespace.starts_with(&self.settings.namespace_prefix)
            && Namespace::validate_name(namespace).is_ok()
        {
            Some(namespace.to_string())
        } else {
            None
        }
    }

    fn lock(&self) -> MutexGuard<'_, MonitorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
