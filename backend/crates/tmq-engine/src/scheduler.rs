//! Periodic driver for rotation, reclaim and queue supervision.
//!
//! One tick:
//! 1. read the namespace table once and split it into due and past-grace
//! 2. rotate the due ones, reclaim the past-grace ones (bounded fan-out)
//! 3. purge broker users whose store record is gone
//! 4. scan queues and exchanges; delete or alert on what the scan flags
//!
//! Every per-namespace and per-resource operation runs under its own
//! timeout and fails in isolation. The tick as a whole runs as a spawned task
//! under a deadline of one iteration; an overrunning tick is counted as failed
//! and left to finish in the background while the next one starts.
//!
//! Ticks may overlap. Two ticks racing on the same namespace are serialised
//! by the store's version check, not by a lock here.

use crate::{
    AlertEvent, AlertSink, Alerter, BreakerState, EngineError, EngineResult, EngineSettings,
    Metrics, NamespaceManager, QueueMonitor, QueueReport, ReclaimOutcome, RotationOutcome,
    SchedulerSettings, ShutdownCoordinator, TickBreaker, TickReport, UserSweep,
};

use tmq_broker::BrokerAdmin;
use tmq_core::{Clock, Namespace, QueueClassification};
use tmq_db::{AlertStore, NamespaceStore};

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::panic::Location;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use futures::stream::{self, StreamExt};
use log::{error, info, warn};
use serde::Serialize;
use tokio::time::MissedTickBehavior;

/// Snapshot served by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerHealth {
    pub breaker: BreakerState,
    pub consecutive_failures: u32,
    pub failure_threshold: u32,
    pub last_tick: Option<TickReport>,
}

enum ResourceAction {
    Deleted,
    AlertFired,
    AlertSuppressed,
    None,
}

#[derive(Clone)]
pub struct Scheduler {
    manager: Arc<NamespaceManager>,
    monitor: Arc<QueueMonitor>,
    alerter: Arc<Alerter>,
    sink: Arc<dyn AlertSink>,
    store: Arc<dyn NamespaceStore>,
    broker: Arc<dyn BrokerAdmin>,
    clock: Arc<dyn Clock>,
    settings: SchedulerSettings,
    breaker: Arc<TickBreaker>,
    users: Arc<UserSweep>,
    last_report: Arc<RwLock<Option<TickReport>>>,
    metrics: Metrics,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn NamespaceStore>,
        alerts: Arc<dyn AlertStore>,
        broker: Arc<dyn BrokerAdmin>,
        sink: Arc<dyn AlertSink>,
        clock: Arc<dyn Clock>,
        settings: EngineSettings,
        metrics: Metrics,
    ) -> Self {
        let manager = NamespaceManager::new(
            store.clone(),
            alerts.clone(),
            broker.clone(),
            clock.clone(),
            settings.namespaces,
            metrics.clone(),
        );
        let alerter = Alerter::new(
            alerts,
            clock.clone(),
            settings.monitor.queue_expiration_delay,
            metrics.clone(),
        );
        let monitor = QueueMonitor::new(
            broker.clone(),
            store.clone(),
            clock.clone(),
            settings.monitor,
            metrics.clone(),
        );

        Self {
            manager: Arc::new(manager),
            monitor: Arc::new(monitor),
            alerter: Arc::new(alerter),
            sink,
            store,
            broker,
            clock,
            breaker: Arc::new(TickBreaker::new(settings.scheduler.iteration_failures)),
            settings: settings.scheduler,
            users: Arc::new(UserSweep::new()),
            last_report: Arc::new(RwLock::new(None)),
            metrics,
        }
    }

    pub fn manager(&self) -> &NamespaceManager {
        &self.manager
    }

    pub fn monitor(&self) -> &QueueMonitor {
        &self.monitor
    }

    pub fn alerter(&self) -> &Alerter {
        &self.alerter
    }

    pub fn breaker(&self) -> &TickBreaker {
        &self.breaker
    }

    pub fn health(&self) -> SchedulerHealth {
        SchedulerHealth {
            breaker: self.breaker.state(),
            consecutive_failures: self.breaker.consecutive_failures(),
            failure_threshold: self.breaker.threshold(),
            last_tick: self
                .last_report
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .clone(),
        }
    }

    /// Drive ticks every `iteration_length` until shutdown or until the
    /// breaker trips.
    pub async fn run(&self, shutdown: &ShutdownCoordinator) -> EngineResult<()> {
        let mut guard = shutdown.subscribe_guard();
        let mut interval = tokio::time::interval(self.settings.iteration_length);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Scheduler started (iteration {:?}, gap {:?}, concurrency {})",
            self.settings.iteration_length,
            self.settings.iteration_gap,
            self.settings.max_concurrency
        );

        loop {
            tokio::select! {
                _ = guard.wait() => {
                    info!("Scheduler stopping");
                    return Ok(());
                }
                _ = interval.tick() => {}
            }

            self.run_once().await?;

            if !self.settings.iteration_gap.is_zero() {
                tokio::select! {
                    _ = guard.wait() => {
                        info!("Scheduler stopping");
                        return Ok(());
                    }
                    _ = tokio::time::sleep(self.settings.iteration_gap) => {}
                }
            }
        }
    }

    /// One deadline-bounded tick, counted against the breaker.
    ///
    /// Fails with `RepeatedTickFailure` if the breaker is (or becomes)
    /// tripped; no tick is attempted while tripped.
    pub async fn run_once(&self) -> EngineResult<TickReport> {
        if self.breaker.is_tripped() {
            return Err(self.tripped_error());
        }

        let report = self.tick_with_deadline().await;
        match self.complete_tick(&report) {
            BreakerState::Closed => Ok(report),
            BreakerState::Tripped => Err(self.tripped_error()),
        }
    }

    async fn tick_with_deadline(&self) -> TickReport {
        let started_at = self.clock.now();
        let deadline = self.settings.iteration_length;
        let this = self.clone();
        let handle = tokio::spawn(async move { this.tick().await });

        match tokio::time::timeout(deadline, handle).await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => TickReport::aborted(started_at, format!("tick task failed: {}", e)),
            Err(_) => {
                warn!(
                    "Tick started at {} overran its {:?} deadline; leaving it to finish",
                    started_at, deadline
                );
                TickReport::aborted(
                    started_at,
                    format!("tick exceeded its {}ms deadline", deadline.as_millis()),
                )
            }
        }
    }

    /// Perform one tick's work. Does not touch the breaker.
    pub async fn tick(&self) -> TickReport {
        let started = Instant::now();
        let now = self.clock.now();
        let mut report = TickReport::new(now);

        let namespaces = match self
            .timed("list namespaces", self.store.list_all())
            .await
        {
            Ok(namespaces) => Some(namespaces),
            Err(e) => {
                error!("Tick cannot read namespaces: {}", e);
                report.record_tick_error(format!("list namespaces: {}", e));
                None
            }
        };

        if let Some(namespaces) = &namespaces {
            self.rotate_and_reclaim(namespaces, now, &mut report).await;
            self.sweep_users(namespaces, now, &mut report).await;
        }

        let contacts: HashMap<String, Option<String>> = namespaces
            .unwrap_or_default()
            .into_iter()
            .map(|n| (n.name, n.contact))
            .collect();
        self.supervise(&contacts, now, &mut report).await;

        let elapsed = started.elapsed();
        self.metrics.tick_duration(elapsed);
        report.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        report
    }

    async fn rotate_and_reclaim(
        &self,
        namespaces: &[Namespace],
        now: DateTime<Utc>,
        report: &mut TickReport,
    ) {
        let prefix = &self.manager.settings().prefix;
        let grace = self.manager.settings().expiration_delay;

        for namespace in namespaces {
            self.users.observe_record(&namespace.name, namespace.expires);
        }

        let (past_grace, due): (Vec<Namespace>, Vec<Namespace>) = namespaces
            .iter()
            .filter(|n| n.name.starts_with(prefix.as_str()) && n.is_due(now))
            .cloned()
            .partition(|n| n.is_past_grace(now, grace));
        report.due = due.len();
        report.past_grace = past_grace.len();

        let manager = &self.manager;

        let rotations = self
            .fan_out(
                "rotate",
                due.into_iter()
                    .map(|ns| (ns.name.clone(), async move { manager.rotate(&ns).await }))
                    .collect(),
            )
            .await;
        for (name, result) in rotations {
            report.operations += 1;
            match result {
                Ok(RotationOutcome::Rotated { namespace, .. }) => {
                    report.rotated += 1;
                    self.users.observe_record(&namespace.name, namespace.expires);
                }
                Ok(RotationOutcome::Conflict) => report.conflicts += 1,
                Ok(RotationOutcome::Skipped) => report.skipped += 1,
                Err(e) => self.record_failure(report, "rotate", &name, &e),
            }
        }

        let reclaims = self
            .fan_out(
                "reclaim",
                past_grace
                    .into_iter()
                    .map(|ns| (ns.name.clone(), async move { manager.reclaim(&ns).await }))
                    .collect(),
            )
            .await;
        for (name, result) in reclaims {
            report.operations += 1;
            match result {
                Ok(ReclaimOutcome::Reclaimed) => {
                    report.reclaimed += 1;
                    self.users.forget(&name);
                }
                Ok(ReclaimOutcome::Conflict) => report.conflicts += 1,
                Ok(ReclaimOutcome::StillLive) => {}
                Err(e) => self.record_failure(report, "reclaim", &name, &e),
            }
        }
    }

    async fn sweep_users(
        &self,
        namespaces: &[Namespace],
        now: DateTime<Utc>,
        report: &mut TickReport,
    ) {
        let settings = self.manager.settings();

        let users = match self.timed("list users", self.broker.list_users()).await {
            Ok(users) => users,
            Err(e) => {
                warn!("Cannot list broker users: {}", e);
                report.record_tick_error(format!("list users: {}", e));
                return;
            }
        };

        let managed: Vec<String> = users
            .into_iter()
            .map(|u| u.name)
            .filter(|name| name.starts_with(&settings.prefix) && *name != settings.admin_username)
            .collect();
        let recorded: HashSet<String> = namespaces.iter().map(|n| n.name.clone()).collect();
        let orphans =
            self.users
                .due_for_purge(&managed, &recorded, now, settings.expiration_delay);

        let manager = &self.manager;
        let purges = self
            .fan_out(
                "purge user",
                orphans
                    .into_iter()
                    .map(|name| {
                        (name.clone(), async move { manager.purge_user(&name).await })
                    })
                    .collect(),
            )
            .await;
        for (name, result) in purges {
            report.operations += 1;
            match result {
                Ok(()) => {
                    info!("Purged orphaned broker user {}", name);
                    report.purged_users += 1;
                    self.users.forget(&name);
                    self.metrics.user_purged();
                }
                Err(e) => self.record_failure(report, "purge_user", &name, &e),
            }
        }
    }

    async fn supervise(
        &self,
        contacts: &HashMap<String, Option<String>>,
        now: DateTime<Utc>,
        report: &mut TickReport,
    ) {
        let resources = match self.timed("scan", self.monitor.scan()).await {
            Ok(resources) => resources,
            Err(e) => {
                warn!("Queue scan failed: {}", e);
                report.record_tick_error(format!("scan: {}", e));
                return;
            }
        };
        report.scanned = resources.len();

        let this = self;
        let actions = self
            .fan_out(
                "supervise",
                resources
                    .into_iter()
                    .filter(|r| r.classification != QueueClassification::Healthy)
                    .map(|resource| {
                        let contact = contacts.get(&resource.namespace).cloned().flatten();
                        (resource.name.clone(), async move {
                            this.act_on(resource, contact, now).await
                        })
                    })
                    .collect(),
            )
            .await;
        for (name, result) in actions {
            report.operations += 1;
            match result {
                Ok(ResourceAction::Deleted) => report.deleted_resources += 1,
                Ok(ResourceAction::AlertFired) => report.alerts_fired += 1,
                Ok(ResourceAction::AlertSuppressed) => report.alerts_suppressed += 1,
                Ok(ResourceAction::None) => {}
                Err(e) => self.record_failure(report, "supervise", &name, &e),
            }
        }
    }

    /// Delete takes precedence: a `Delete` resource is never alerted on.
    async fn act_on(
        &self,
        resource: QueueReport,
        contact: Option<String>,
        observed_at: DateTime<Utc>,
    ) -> EngineResult<ResourceAction> {
        match resource.classification {
            QueueClassification::Delete => {
                self.manager.delete_resource(&resource).await?;
                Ok(ResourceAction::Deleted)
            }
            QueueClassification::Alert => {
                let key = resource.alert_key();
                if !self
                    .alerter
                    .should_alert(&key, resource.classification)
                    .await?
                {
                    return Ok(ResourceAction::AlertSuppressed);
                }

                let settings = self.monitor.settings();
                let event = AlertEvent {
                    key,
                    contact,
                    message_count: resource.message_count,
                    rate: resource.rate,
                    alert_threshold: settings.alert_threshold,
                    delete_threshold: settings.delete_threshold,
                    observed_at,
                };
                self.sink.deliver(&event).await?;
                Ok(ResourceAction::AlertFired)
            }
            QueueClassification::Healthy => Ok(ResourceAction::None),
        }
    }

    /// Run `ops` at most `max_concurrency` at a time, each under the
    /// per-operation timeout. The timeout starts when an op is admitted.
    async fn fan_out<O, Fut>(
        &self,
        operation: &'static str,
        ops: Vec<(String, Fut)>,
    ) -> Vec<(String, EngineResult<O>)>
    where
        Fut: Future<Output = EngineResult<O>>,
    {
        let timeout = self.settings.operation_timeout;

        stream::iter(ops.into_iter().map(|(name, op)| async move {
            let result = match tokio::time::timeout(timeout, op).await {
                Ok(result) => result,
                Err(_) => Err(EngineError::timeout(
                    format!("{} {}", operation, name),
                    timeout,
                )),
            };
            (name, result)
        }))
        .buffer_unordered(self.settings.max_concurrency.max(1))
        .collect()
        .await
    }

    async fn timed<T, E, F>(&self, operation: &str, future: F) -> EngineResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<EngineError>,
    {
        match tokio::time::timeout(self.settings.operation_timeout, future).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(EngineError::timeout(
                operation,
                self.settings.operation_timeout,
            )),
        }
    }

    fn record_failure(
        &self,
        report: &mut TickReport,
        operation: &str,
        name: &str,
        error: &EngineError,
    ) {
        report.failed_operations += 1;
        self.metrics.operation_failed(operation);

        if error.is_transient() {
            warn!("{} {} failed, retrying next tick: {}", operation, name, error);
        } else {
            warn!("{} {} failed: {}", operation, name, error);
        }
    }

    fn complete_tick(&self, report: &TickReport) -> BreakerState {
        let failed = report.is_failed();
        self.metrics.tick_completed(failed);

        let state = if failed {
            warn!(
                "Tick failed ({} of {} operations failed{})",
                report.failed_operations,
                report.operations,
                report
                    .tick_error
                    .as_deref()
                    .map(|e| format!("; {}", e))
                    .unwrap_or_default()
            );
            let was_tripped = self.breaker.is_tripped();
            let state = self.breaker.record_failure();
            if state == BreakerState::Tripped && !was_tripped {
                self.metrics.breaker_tripped();
            }
            state
        } else {
            self.breaker.record_success();
            self.breaker.state()
        };
        self.metrics
            .consecutive_failures(self.breaker.consecutive_failures());

        info!(
            "Tick done in {}ms: {} due, {} rotated, {} conflicts, {} reclaimed, {} users purged, {} scanned, {} deleted, {} alerts",
            report.duration_ms,
            report.due,
            report.rotated,
            report.conflicts,
            report.reclaimed,
            report.purged_users,
            report.scanned,
            report.deleted_resources,
            report.alerts_fired
        );

        *self.last_report.write().unwrap_or_else(|e| e.into_inner()) = Some(report.clone());

        state
    }

    #[track_caller]
    fn tripped_error(&self) -> EngineError {
        EngineError::RepeatedTickFailure {
            consecutive: self.breaker.consecutive_failures(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
