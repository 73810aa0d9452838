
use crate::MonitorSettings;

use chrono::Duration;

/// Monitor settings with small, easy-to-reason-about thresholds.
pub(crate) fn monitor_settings() -> MonitorSettings {
    MonitorSettings {
        vhost: String::from("/"),
        namespace_prefix: String::from("tc-"),
        queue_prefix: String::from("queue/"),
        exchange_prefix: String::from("exchange/"),
        alert_threshold: 100,
        delete_threshold: 1000,
        connection_max_lifetime: Duration::hours(1),
        message_count_tolerance: 0,
        message_publish_rate_tolerance: 0.0,
        queue_expiration_delay: Duration::hours(24),
    }
}
