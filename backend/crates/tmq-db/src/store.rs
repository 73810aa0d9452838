use crate::Result as DbErrorResult;

use tmq_core::{AlertKey, Namespace};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// Persisted namespace table with optimistic concurrency.
///
/// `rotation_version` is the version token: conditional writes succeed only
/// when the stored token still equals the one the caller read.
#[async_trait]
pub trait NamespaceStore: Send + Sync {
    async fn insert(&self, namespace: &Namespace) -> DbErrorResult<()>;

    async fn get(&self, name: &str) -> DbErrorResult<Option<Namespace>>;

    async fn list_all(&self) -> DbErrorResult<Vec<Namespace>>;

    /// Replace the row named `updated.name` if its version is still
    /// `expected_version`. Returns false on a stale token or missing row.
    async fn compare_and_swap(
        &self,
        expected_version: i64,
        updated: &Namespace,
    ) -> DbErrorResult<bool>;

    /// Delete the row if its version is still `expected_version`.
    async fn delete_if_version(&self, name: &str, expected_version: i64) -> DbErrorResult<bool>;
}

/// Persisted last-alert timestamps.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn last_alert_at(&self, key: &AlertKey) -> DbErrorResult<Option<DateTime<Utc>>>;

    /// Set `last_alert_at = now` unless an alert was recorded within
    /// `suppression` of `now`. Returns whether the write happened.
    ///
    /// Check and write are a single statement, so of two concurrent callers
    /// inside the window only one sees `true`.
    async fn try_record_alert(
        &self,
        key: &AlertKey,
        now: DateTime<Utc>,
        suppression: Duration,
    ) -> DbErrorResult<bool>;

    async fn delete_for_namespace(&self, namespace: &str) -> DbErrorResult<u64>;
}
