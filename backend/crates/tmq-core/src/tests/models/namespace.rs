use crate::{CoreError, Namespace};

use chrono::{Duration, TimeZone, Utc};

fn start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

#[test]
fn test_namespace_name_validation() {
    assert!(Namespace::validate_name("tc-foo").is_ok());
    assert!(Namespace::validate_name("tc_foo_123").is_ok());
    assert!(Namespace::validate_name("").is_err());
    assert!(Namespace::validate_name("tc/foo").is_err());
    assert!(Namespace::validate_name("tc.foo").is_err());
    assert!(Namespace::validate_name("tc-(.*)").is_err());
    assert!(Namespace::validate_name(&"a".repeat(65)).is_err());
}

#[test]
fn test_new_namespace_starts_at_version_zero() {
    let ns = Namespace::new("tc-foo", start(), start() + Duration::hours(1), None).unwrap();
    assert_eq!(ns.rotation_version, 0);
    assert_eq!(ns.name, "tc-foo");
}

#[test]
fn test_new_namespace_rejects_expiry_before_creation() {
    let result = Namespace::new("tc-foo", start(), start() - Duration::seconds(1), None);
    assert!(result.is_err());
}

#[test]
fn test_is_due_and_past_grace() {
    let ns = Namespace::new("tc-foo", start(), start() + Duration::hours(1), None).unwrap();
    let grace = Duration::hours(24);

    assert!(!ns.is_due(start()));
    assert!(ns.is_due(start() + Duration::hours(1)));
    assert!(!ns.is_past_grace(start() + Duration::hours(2), grace));
    assert!(ns.is_past_grace(start() + Duration::hours(26), grace));
}

#[test]
fn test_rotated_advances_from_previous_deadline() {
    let ns = Namespace::new("tc-foo", start(), start() + Duration::hours(1), None).unwrap();

    let rotated = ns
        .rotated(start() + Duration::minutes(61), Duration::hours(1))
        .unwrap();

    assert_eq!(rotated.expires, start() + Duration::hours(2));
    assert_eq!(rotated.rotation_version, 1);
    assert_eq!(rotated.created, ns.created);
}

#[test]
fn test_rotated_long_overdue_namespace_restarts_from_now() {
    let ns = Namespace::new("tc-foo", start(), start() + Duration::hours(1), None).unwrap();
    let now = start() + Duration::hours(5);

    let rotated = ns.rotated(now, Duration::hours(1)).unwrap();

    assert_eq!(rotated.expires, now + Duration::hours(1));
    assert!(rotated.expires > ns.expires);
}

#[test]
fn test_grace_reaching_before_earliest_instant_is_never_past() {
    let ns = Namespace::new("tc-foo", start(), start() + Duration::hours(1), None).unwrap();

    assert!(!ns.is_past_grace(start() + Duration::hours(26), Duration::MAX));
}

#[test]
fn test_rotated_beyond_latest_instant_is_an_error() {
    let ns = Namespace::new("tc-foo", start(), start() + Duration::hours(1), None).unwrap();

    let result = ns.rotated(start() + Duration::minutes(61), Duration::MAX);

    assert!(matches!(result, Err(CoreError::TimeOverflow { .. })));
}
