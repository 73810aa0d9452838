//! Engine-side view of the configuration, in the units the engine computes
//! with: `chrono` durations for anything compared against record timestamps
//! and `std` durations for timers.

use tmq_config::{Config, ConfigError, ConfigErrorResult, Section};
use tmq_core::PermissionTemplates;

use std::time::Duration as StdDuration;

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct NamespaceSettings {
    pub prefix: String,
    pub vhost: String,
    /// The management user itself; never swept even if it carries the prefix
    pub admin_username: String,
    pub rotation_interval: Duration,
    /// Reclaim grace period after `expires`
    pub expiration_delay: Duration,
    pub templates: PermissionTemplates,
    pub user_tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub vhost: String,
    pub namespace_prefix: String,
    pub queue_prefix: String,
    pub exchange_prefix: String,
    pub alert_threshold: u64,
    pub delete_threshold: u64,
    /// How long a resource must stay orphaned before it is deleted
    pub connection_max_lifetime: Duration,
    pub message_count_tolerance: u64,
    pub message_publish_rate_tolerance: f64,
    /// Alert suppression window per queue
    pub queue_expiration_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Tick interval, and the deadline for a single tick
    pub iteration_length: StdDuration,
    /// Extra pause after each tick
    pub iteration_gap: StdDuration,
    /// Consecutive failed ticks before the breaker trips
    pub iteration_failures: u32,
    pub max_concurrency: usize,
    pub operation_timeout: StdDuration,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub namespaces: NamespaceSettings,
    pub monitor: MonitorSettings,
    pub scheduler: SchedulerSettings,
}

impl EngineSettings {
    /// Expects a config that already passed `Config::validate`; a duration
    /// chrono cannot represent is still rejected here.
    pub fn from_config(config: &Config) -> ConfigErrorResult<Self> {
        let namespaces = NamespaceSettings {
            prefix: config.namespaces.prefix.clone(),
            vhost: config.broker.vhost.clone(),
            admin_username: config.broker.username.clone(),
            rotation_interval: seconds(
                Section::Namespaces,
                "namespaces.rotation_interval_secs",
                config.namespaces.rotation_interval_secs,
            )?,
            expiration_delay: seconds(
                Section::Namespaces,
                "namespaces.expiration_delay_secs",
                config.namespaces.expiration_delay_secs,
            )?,
            templates: config.namespaces.permission_templates()?,
            user_tags: config.namespaces.user_tags.clone(),
        };

        let monitor = MonitorSettings {
            vhost: config.broker.vhost.clone(),
            namespace_prefix: config.namespaces.prefix.clone(),
            queue_prefix: config.monitor.queue_prefix.clone(),
            exchange_prefix: config.monitor.exchange_prefix.clone(),
            alert_threshold: config.monitor.alert_threshold,
            delete_threshold: config.monitor.delete_threshold,
            connection_max_lifetime: seconds(
                Section::Monitor,
                "monitor.connection_max_lifetime_secs",
                config.monitor.connection_max_lifetime_secs,
            )?,
            message_count_tolerance: config.monitor.message_count_tolerance,
            message_publish_rate_tolerance: config.monitor.message_publish_rate_tolerance,
            queue_expiration_delay: seconds(
                Section::Monitor,
                "monitor.queue_expiration_delay_secs",
                config.monitor.queue_expiration_delay_secs,
            )?,
        };

        let scheduler = SchedulerSettings {
            iteration_length: StdDuration::from_secs(config.scheduler.iteration_length_secs),
            iteration_gap: StdDuration::from_secs(config.scheduler.iteration_gap_secs),
            iteration_failures: config.scheduler.iteration_failures,
            max_concurrency: config.scheduler.max_concurrency,
            operation_timeout: StdDuration::from_secs(config.scheduler.operation_timeout_secs),
        };

        Ok(Self {
            namespaces,
            monitor,
            scheduler,
        })
    }
}

fn seconds(section: Section, field: &str, secs: u64) -> ConfigErrorResult<Duration> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| {
            ConfigError::invalid(section, format!("{field} is out of range, got {secs}"))
        })
}
