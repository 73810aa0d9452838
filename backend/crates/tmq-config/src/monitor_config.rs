use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_ALERT_THRESHOLD, DEFAULT_CONNECTION_MAX_LIFETIME_SECS,
    DEFAULT_DELETE_THRESHOLD, DEFAULT_EXCHANGE_PREFIX, DEFAULT_QUEUE_EXPIRATION_DELAY_SECS,
    DEFAULT_QUEUE_PREFIX, MAX_CONNECTION_MAX_LIFETIME_SECS, MAX_QUEUE_EXPIRATION_DELAY_SECS,
    Section,
};

use serde::Deserialize;

/// Queue supervision and alerting settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub queue_prefix: String,
    pub exchange_prefix: String,
    pub alert_threshold: u64,
    pub delete_threshold: u64,
    /// Minimum age of an orphaned queue before it may be deleted
    pub connection_max_lifetime_secs: u64,
    /// Headroom over `alert_threshold` within which a non-growing queue is not alerted on
    pub message_count_tolerance: u64,
    /// Growth rate (messages/s) at or below which a queue counts as not growing
    pub message_publish_rate_tolerance: f64,
    /// Suppression window between two alerts for the same queue
    pub queue_expiration_delay_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            queue_prefix: String::from(DEFAULT_QUEUE_PREFIX),
            exchange_prefix: String::from(DEFAULT_EXCHANGE_PREFIX),
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            delete_threshold: DEFAULT_DELETE_THRESHOLD,
            connection_max_lifetime_secs: DEFAULT_CONNECTION_MAX_LIFETIME_SECS,
            message_count_tolerance: 0,
            message_publish_rate_tolerance: 0.0,
            queue_expiration_delay_secs: DEFAULT_QUEUE_EXPIRATION_DELAY_SECS,
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.queue_prefix.is_empty() || self.exchange_prefix.is_empty() {
            return Err(ConfigError::invalid(
                Section::Monitor,
                "monitor.queue_prefix and monitor.exchange_prefix must not be empty",
            ));
        }

        if self.queue_prefix == self.exchange_prefix {
            return Err(ConfigError::invalid(
                Section::Monitor,
                "monitor.queue_prefix and monitor.exchange_prefix must differ",
            ));
        }

        if self.alert_threshold == 0 {
            return Err(ConfigError::invalid(
                Section::Monitor,
                "monitor.alert_threshold must be > 0",
            ));
        }

        if self.delete_threshold <= self.alert_threshold {
            return Err(ConfigError::invalid(
                Section::Monitor,
                format!(
                    "monitor.delete_threshold ({}) must be greater than alert_threshold ({})",
                    self.delete_threshold, self.alert_threshold
                ),
            ));
        }

        if !self.message_publish_rate_tolerance.is_finite()
            || self.message_publish_rate_tolerance < 0.0
        {
            return Err(ConfigError::invalid(
                Section::Monitor,
                format!(
                    "monitor.message_publish_rate_tolerance must be a finite value >= 0, got {}",
                    self.message_publish_rate_tolerance
                ),
            ));
        }

        if self.connection_max_lifetime_secs > MAX_CONNECTION_MAX_LIFETIME_SECS {
            return Err(ConfigError::invalid(
                Section::Monitor,
                format!(
                    "monitor.connection_max_lifetime_secs must be <= {}, got {}",
                    MAX_CONNECTION_MAX_LIFETIME_SECS, self.connection_max_lifetime_secs
                ),
            ));
        }

        if self.queue_expiration_delay_secs == 0
            || self.queue_expiration_delay_secs > MAX_QUEUE_EXPIRATION_DELAY_SECS
        {
            return Err(ConfigError::invalid(
                Section::Monitor,
                format!(
                    "monitor.queue_expiration_delay_secs must be 1-{}, got {}",
                    MAX_QUEUE_EXPIRATION_DELAY_SECS, self.queue_expiration_delay_secs
                ),
            ));
        }

        Ok(())
    }
}
