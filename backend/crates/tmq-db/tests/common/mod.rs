#![allow(dead_code)]

use tmq_core::Namespace;

use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::SqlitePool;

/// Creates an in-memory SQLite pool with migrations run
pub async fn create_test_pool() -> SqlitePool {
    tmq_db::open_in_memory()
        .await
        .expect("Failed to create test pool")
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// Namespace created at `t0()` expiring one hour later.
pub fn create_test_namespace(name: &str) -> Namespace {
    Namespace::new(name, t0(), t0() + Duration::hours(1), None).unwrap()
}
