use crate::QueueSnapshot;

use chrono::{Duration, TimeZone, Utc};

fn snapshot(count: u64, seconds: i64) -> QueueSnapshot {
    QueueSnapshot {
        queue_name: "queue/tc-foo/jobs".to_string(),
        namespace: "tc-foo".to_string(),
        message_count: count,
        observed_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(seconds),
    }
}

#[test]
fn test_rate_is_messages_per_second() {
    let rate = snapshot(250, 15).rate_since(&snapshot(100, 0)).unwrap();
    assert!((rate - 10.0).abs() < f64::EPSILON);
}

#[test]
fn test_rate_is_negative_when_draining() {
    let rate = snapshot(50, 10).rate_since(&snapshot(100, 0)).unwrap();
    assert!(rate < 0.0);
}

#[test]
fn test_rate_is_none_without_elapsed_time() {
    assert!(snapshot(50, 0).rate_since(&snapshot(100, 0)).is_none());
}
