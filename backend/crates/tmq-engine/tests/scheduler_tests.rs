mod common;

use common::{Harness, engine_settings, t0};

use tmq_engine::{BreakerState, EngineError, ShutdownCoordinator};

use std::time::Duration as StdDuration;

use chrono::Duration;
use googletest::prelude::*;

#[tokio::test]
async fn given_due_and_fresh_namespaces_when_ticked_then_only_due_are_rotated() {
    // Given: One namespace due now, one due in five hours
    let h = Harness::new().await;
    h.add_namespace("tc-due", Duration::hours(1)).await;
    let fresh = h.add_namespace("tc-fresh", Duration::hours(6)).await;
    h.clock.advance(Duration::minutes(61));

    // When: Ticking
    let report = h.scheduler.tick().await;

    // Then: Only the due one was rotated
    assert_that!(report.due, eq(1));
    assert_that!(report.rotated, eq(1));
    assert!(!report.is_failed());
    assert_that!(h.namespace("tc-due").await.unwrap().rotation_version, eq(1));
    assert_that!(h.namespace("tc-fresh").await, some(eq(&fresh)));
    assert!(h.broker.user("tc-fresh").is_none());
}

#[tokio::test]
async fn given_namespace_left_past_grace_when_ticked_then_reclaimed() {
    // Given: A namespace nobody rotated for 26 hours
    let h = Harness::new().await;
    h.add_namespace("tc-idle", Duration::hours(1)).await;
    h.broker.add_user("tc-idle", "old");
    h.clock.advance(Duration::hours(26));

    // When: Ticking
    let report = h.scheduler.tick().await;

    // Then: It is reclaimed rather than rotated
    assert_that!(report.past_grace, eq(1));
    assert_that!(report.reclaimed, eq(1));
    assert_that!(report.rotated, eq(0));
    assert!(h.broker.user("tc-idle").is_none());
    assert_that!(h.namespace("tc-idle").await, none());
}

#[tokio::test]
async fn given_one_tenant_failing_when_ticked_then_others_still_rotate() {
    // Given: Three due namespaces, one of which the broker rejects
    let h = Harness::new().await;
    for name in ["tc-a", "tc-b", "tc-c"] {
        h.add_namespace(name, Duration::hours(1)).await;
    }
    h.broker.fail_target("tc-b");
    h.clock.advance(Duration::minutes(61));

    // When: Ticking
    let report = h.scheduler.tick().await;

    // Then: The failure is isolated and the tick as a whole succeeds
    assert_that!(report.rotated, eq(2));
    assert_that!(report.failed_operations, eq(1));
    assert!(!report.is_failed());
    assert_that!(h.namespace("tc-b").await.unwrap().rotation_version, eq(0));
}

#[tokio::test]
async fn given_broker_down_when_ticks_keep_failing_then_breaker_trips_and_halts() {
    // Given: Two due namespaces and a broker refusing every user write
    let h = Harness::new().await;
    h.add_namespace("tc-a", Duration::hours(1)).await;
    h.add_namespace("tc-b", Duration::hours(1)).await;
    h.clock.advance(Duration::minutes(61));
    h.broker.fail("put_user");

    // When: Three ticks run (threshold is 3)
    let first = h.scheduler.run_once().await;
    let second = h.scheduler.run_once().await;
    let third = h.scheduler.run_once().await;

    // Then: The third trips the breaker
    assert!(first.unwrap().is_failed());
    assert!(second.unwrap().is_failed());
    assert!(matches!(
        third,
        Err(EngineError::RepeatedTickFailure { consecutive: 3, .. })
    ));
    assert_that!(h.scheduler.health().breaker, eq(BreakerState::Tripped));

    // And: No further rotation is attempted, even once the broker recovers
    h.broker.heal("put_user");
    let attempts = h.broker.calls("put_user");
    let again = h.scheduler.run_once().await;
    assert!(matches!(again, Err(EngineError::RepeatedTickFailure { .. })));
    assert_that!(h.broker.calls("put_user"), eq(attempts));
    assert_that!(h.namespace("tc-a").await.unwrap().rotation_version, eq(0));
}

#[tokio::test]
async fn given_tripped_breaker_when_reset_then_rotation_resumes() {
    let h = Harness::new().await;
    h.add_namespace("tc-a", Duration::hours(1)).await;
    h.clock.advance(Duration::minutes(61));
    h.broker.fail("list_queues");
    for _ in 0..3 {
        let _ = h.scheduler.run_once().await;
    }
    assert!(h.scheduler.breaker().is_tripped());

    h.broker.heal("list_queues");
    h.scheduler.breaker().reset();
    let report = h.scheduler.run_once().await.unwrap();

    assert!(!report.is_failed());
    assert_that!(h.scheduler.health().consecutive_failures, eq(0));
}

#[tokio::test]
async fn given_failed_tick_followed_by_good_tick_then_failure_count_resets() {
    let h = Harness::new().await;
    h.broker.fail("list_users");
    let failed = h.scheduler.run_once().await.unwrap();
    assert!(failed.is_failed());
    assert_that!(h.scheduler.health().consecutive_failures, eq(1));

    h.broker.heal("list_users");
    let good = h.scheduler.run_once().await.unwrap();

    assert!(!good.is_failed());
    assert_that!(h.scheduler.health().consecutive_failures, eq(0));
}

#[tokio::test]
async fn given_broker_listing_fails_when_ticked_then_tick_level_error() {
    let h = Harness::new().await;
    h.broker.fail("list_queues");

    let report = h.scheduler.tick().await;

    assert!(report.is_failed());
    assert_that!(report.tick_error.as_deref(), some(contains_substring("scan")));
}

#[tokio::test]
async fn given_idle_system_when_ticked_then_success() {
    let h = Harness::new().await;

    let report = h.scheduler.tick().await;

    assert_that!(report.operations, eq(0));
    assert!(!report.is_failed());
}

#[tokio::test]
async fn given_flagged_queues_when_ticked_then_delete_and_alert_once_per_window() {
    // Given: One queue past the delete threshold and one past the alert threshold
    let h = Harness::new().await;
    let mut namespace = h.add_namespace("tc-foo", Duration::hours(6)).await;
    namespace.contact = Some(String::from("ops@example.com"));
    assert!(
        tmq_db::NamespaceStore::compare_and_swap(h.store.as_ref(), 0, &namespace)
            .await
            .unwrap()
    );
    h.broker.set_queue("queue/tc-foo/huge", 5000);
    h.broker.set_queue("queue/tc-foo/big", 500);

    // When: Ticking twice, an hour apart
    let first = h.scheduler.tick().await;
    h.clock.advance(Duration::hours(1));
    let second = h.scheduler.tick().await;

    // Then: The huge queue is deleted without an alert; the big one alerts once
    assert_that!(first.deleted_resources, eq(1));
    assert_that!(first.alerts_fired, eq(1));
    assert!(!h.broker.has_queue("queue/tc-foo/huge"));
    assert!(h.broker.has_queue("queue/tc-foo/big"));
    assert_that!(second.alerts_fired, eq(0));
    assert_that!(second.alerts_suppressed, eq(1));

    let events = h.sink.events();
    assert_that!(events.len(), eq(1));
    assert_that!(events[0].key.queue_name, eq("queue/tc-foo/big"));
    assert_that!(events[0].contact.as_deref(), some(eq("ops@example.com")));
    assert_that!(events[0].message_count, eq(500));
}

#[tokio::test]
async fn given_many_due_namespaces_when_ticked_then_concurrency_is_bounded() {
    // Given: Ten due namespaces and a slow broker
    let h = Harness::new().await;
    for i in 0..10 {
        h.add_namespace(&format!("tc-{i}"), Duration::hours(1)).await;
    }
    h.clock.advance(Duration::minutes(61));
    h.broker.delay("put_user", StdDuration::from_millis(30));

    // When: Ticking with max_concurrency = 4
    let report = h.scheduler.tick().await;

    // Then: All rotate, never more than four at once
    assert_that!(report.rotated, eq(10));
    assert_that!(h.broker.max_in_flight(), le(4));
    assert_that!(h.broker.max_in_flight(), ge(2));
}

#[tokio::test]
async fn given_slow_broker_call_when_ticked_then_operation_times_out_as_failure() {
    // Given: A per-operation timeout of 100ms and a 500ms user write
    let mut settings = engine_settings();
    settings.scheduler.operation_timeout = StdDuration::from_millis(100);
    let h = Harness::with_settings(settings).await;
    h.add_namespace("tc-slow", Duration::hours(1)).await;
    h.clock.advance(Duration::minutes(61));
    h.broker.delay("put_user", StdDuration::from_millis(500));

    // When: Ticking
    let report = h.scheduler.tick().await;

    // Then: The rotation counts as failed and nothing was advanced
    assert_that!(report.failed_operations, eq(1));
    assert!(report.is_failed());
    assert_that!(h.namespace("tc-slow").await.unwrap().rotation_version, eq(0));
}

#[tokio::test]
async fn given_tick_slower_than_iteration_when_run_once_then_counted_as_failed() {
    // Given: A 300ms iteration and broker listings of 200ms each
    let mut settings = engine_settings();
    settings.scheduler.iteration_length = StdDuration::from_millis(300);
    settings.scheduler.operation_timeout = StdDuration::from_millis(250);
    let h = Harness::with_settings(settings).await;
    h.broker.delay("list_users", StdDuration::from_millis(200));
    h.broker.delay("list_queues", StdDuration::from_millis(200));

    // When: Running one deadline-bounded tick
    let report = h.scheduler.run_once().await.unwrap();

    // Then: It is reported as a deadline overrun
    assert!(report.is_failed());
    assert_that!(report.tick_error.as_deref(), some(contains_substring("deadline")));
    assert_that!(h.scheduler.health().consecutive_failures, eq(1));
}

#[tokio::test]
async fn given_persistent_failure_when_running_then_run_returns_repeated_tick_failure() {
    let mut settings = engine_settings();
    settings.scheduler.iteration_length = StdDuration::from_millis(50);
    settings.scheduler.operation_timeout = StdDuration::from_millis(50);
    settings.scheduler.iteration_failures = 2;
    let h = Harness::with_settings(settings).await;
    h.broker.fail("list_queues");
    let coordinator = ShutdownCoordinator::new();

    let result = tokio::time::timeout(StdDuration::from_secs(5), h.scheduler.run(&coordinator))
        .await
        .expect("run should stop on its own");

    assert!(matches!(
        result,
        Err(EngineError::RepeatedTickFailure { consecutive: 2, .. })
    ));
}

#[tokio::test]
async fn given_running_scheduler_when_shutdown_then_run_returns_ok() {
    let mut settings = engine_settings();
    settings.scheduler.iteration_length = StdDuration::from_millis(50);
    settings.scheduler.operation_timeout = StdDuration::from_millis(50);
    settings.scheduler.iteration_gap = StdDuration::from_millis(10);
    let h = Harness::with_settings(settings).await;
    let coordinator = ShutdownCoordinator::new();

    let trigger = coordinator.clone();
    tokio::spawn(async move {
        tokio::time::sleep(StdDuration::from_millis(200)).await;
        trigger.shutdown();
    });
    let result = tokio::time::timeout(StdDuration::from_secs(5), h.scheduler.run(&coordinator))
        .await
        .expect("run should stop on shutdown");

    assert_that!(result, ok(anything()));
    assert_that!(h.scheduler.health().last_tick, some(anything()));
}

#[tokio::test]
async fn given_stray_broker_user_when_swept_then_purged_after_grace() {
    // Given: A managed-prefix broker user with no store record, plus the admin
    let h = Harness::new().await;
    h.broker.add_user("tc-stray", "pw");
    h.broker.add_user("admin", "root");

    // When: Ticking at first sight and again a day and an hour later
    let first = h.scheduler.tick().await;
    h.clock.advance(Duration::hours(25));
    let later = h.scheduler.tick().await;

    // Then: Only the later tick purges it; the admin is untouched
    assert_that!(first.purged_users, eq(0));
    assert_that!(later.purged_users, eq(1));
    assert!(h.broker.user("tc-stray").is_none());
    assert!(h.broker.authenticate("admin", "root"));
}

#[tokio::test]
async fn given_completed_tick_when_health_read_then_serializable_snapshot() {
    let h = Harness::new().await;
    h.add_namespace("tc-foo", Duration::hours(1)).await;
    h.clock.advance(Duration::minutes(61));
    h.scheduler.run_once().await.unwrap();

    let health = h.scheduler.health();
    let json = serde_json::to_value(&health).unwrap();

    assert_that!(health.breaker, eq(BreakerState::Closed));
    assert_that!(json["breaker"].as_str(), some(eq("closed")));
    assert_that!(json["last_tick"]["rotated"].as_u64(), some(eq(1)));
    assert_that!(
        health.last_tick.unwrap().started_at,
        eq(t0() + Duration::minutes(61))
    );
}
