use chrono::{DateTime, Utc};
use serde::Serialize;

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub started_at: DateTime<Utc>,
    pub due: usize,
    pub rotated: usize,
    pub conflicts: usize,
    pub skipped: usize,
    pub past_grace: usize,
    pub reclaimed: usize,
    pub purged_users: usize,
    pub scanned: usize,
    pub deleted_resources: usize,
    pub alerts_fired: usize,
    pub alerts_suppressed: usize,
    /// Per-namespace and per-resource operations attempted
    pub operations: usize,
    pub failed_operations: usize,
    /// Set when the tick could not do its job at all: store unreadable,
    /// broker listing failed, or the tick overran its deadline
    pub tick_error: Option<String>,
    pub duration_ms: u64,
}

impl TickReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            due: 0,
            rotated: 0,
            conflicts: 0,
            skipped: 0,
            past_grace: 0,
            reclaimed: 0,
            purged_users: 0,
            scanned: 0,
            deleted_resources: 0,
            alerts_fired: 0,
            alerts_suppressed: 0,
            operations: 0,
            failed_operations: 0,
            tick_error: None,
            duration_ms: 0,
        }
    }

    /// A tick that never produced a report of its own.
    pub fn aborted(started_at: DateTime<Utc>, error: impl Into<String>) -> Self {
        Self {
            tick_error: Some(error.into()),
            ..Self::new(started_at)
        }
    }

    /// Keeps the first tick-level error; later ones are usually knock-on.
    pub fn record_tick_error(&mut self, error: impl Into<String>) {
        if self.tick_error.is_none() {
            self.tick_error = Some(error.into());
        }
    }

    /// Failed when a tick-level error occurred or more than half of the
    /// attempted operations failed. An idle tick succeeds.
    pub fn is_failed(&self) -> bool {
        self.tick_error.is_some() || self.failed_operations * 2 > self.operations
    }
}
