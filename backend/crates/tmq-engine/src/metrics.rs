use tmq_core::{QueueClassification, ResourceKind};

use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Metrics collector for the rotation and supervision engine
#[derive(Clone)]
pub struct Metrics {
    prefix: &'static str,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            prefix: "tmq_engine",
        }
    }

    pub fn tick_completed(&self, failed: bool) {
        counter!(format!("{}.ticks.total", self.prefix)).increment(1);
        if failed {
            counter!(format!("{}.ticks.failed", self.prefix)).increment(1);
        }
    }

    pub fn tick_duration(&self, duration: Duration) {
        histogram!(format!("{}.ticks.duration_ms", self.prefix))
            .record(duration.as_millis() as f64);
    }

    pub fn consecutive_failures(&self, count: u32) {
        gauge!(format!("{}.breaker.consecutive_failures", self.prefix)).set(count as f64);
    }

    pub fn breaker_tripped(&self) {
        counter!(format!("{}.breaker.tripped", self.prefix)).increment(1);
    }

    /// `outcome` is one of rotated / conflict / skipped
    pub fn rotation(&self, outcome: &str) {
        counter!(format!("{}.rotations.{}", self.prefix, outcome)).increment(1);
    }

    /// `outcome` is one of reclaimed / still_live / conflict
    pub fn reclaim(&self, outcome: &str) {
        counter!(format!("{}.reclaims.{}", self.prefix, outcome)).increment(1);
    }

    pub fn user_purged(&self) {
        counter!(format!("{}.users.purged", self.prefix)).increment(1);
    }

    pub fn resource_deleted(&self, kind: ResourceKind) {
        counter!(format!("{}.resources.deleted.{}", self.prefix, kind.as_str())).increment(1);
    }

    pub fn resources_classified(&self, classification: QueueClassification, count: usize) {
        gauge!(format!(
            "{}.resources.{}",
            self.prefix,
            classification.as_str()
        ))
        .set(count as f64);
    }

    pub fn alert_fired(&self) {
        counter!(format!("{}.alerts.fired", self.prefix)).increment(1);
    }

    pub fn alert_suppressed(&self) {
        counter!(format!("{}.alerts.suppressed", self.prefix)).increment(1);
    }

    pub fn operation_failed(&self, operation: &str) {
        counter!(format!("{}.errors.total", self.prefix)).increment(1);
        counter!(format!("{}.errors.{}", self.prefix, operation)).increment(1);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
