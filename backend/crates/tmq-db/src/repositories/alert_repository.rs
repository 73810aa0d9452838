use crate::repositories::from_millis;
use crate::{AlertStore, Result as DbErrorResult};

use tmq_core::AlertKey;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

pub struct AlertRepository {
    pool: SqlitePool,
}

impl AlertRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertStore for AlertRepository {
    async fn last_alert_at(&self, key: &AlertKey) -> DbErrorResult<Option<DateTime<Utc>>> {
        let value: Option<i64> = sqlx::query_scalar(
            r#"
                SELECT last_alert_at FROM tmq_alerts
                WHERE namespace = ? AND queue_name = ?
            "#,
        )
        .bind(&key.namespace)
        .bind(&key.queue_name)
        .fetch_optional(&self.pool)
        .await?;

        value
            .map(|ms| from_millis(ms, "tmq_alerts.last_alert_at"))
            .transpose()
    }

    async fn try_record_alert(
        &self,
        key: &AlertKey,
        now: DateTime<Utc>,
        suppression: Duration,
    ) -> DbErrorResult<bool> {
        let now_ms = now.timestamp_millis();
        // A window reaching past the earliest instant suppresses every repeat.
        let cutoff_ms = now
            .checked_sub_signed(suppression)
            .map_or(i64::MIN, |cutoff| cutoff.timestamp_millis());

        // The DO UPDATE is skipped (zero changes) while the last alert is
        // still inside the window.
        let result = sqlx::query(
            r#"
                INSERT INTO tmq_alerts (namespace, queue_name, last_alert_at)
                VALUES (?, ?, ?)
                ON CONFLICT (namespace, queue_name) DO UPDATE
                SET last_alert_at = excluded.last_alert_at
                WHERE tmq_alerts.last_alert_at < ?
            "#,
        )
        .bind(&key.namespace)
        .bind(&key.queue_name)
        .bind(now_ms)
        .bind(cutoff_ms)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_for_namespace(&self, namespace: &str) -> DbErrorResult<u64> {
        let result = sqlx::query("DELETE FROM tmq_alerts WHERE namespace = ?")
            .bind(namespace)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
