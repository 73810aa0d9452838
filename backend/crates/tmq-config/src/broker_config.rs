use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_BROKER_URL, DEFAULT_BROKER_USERNAME,
    DEFAULT_BROKER_VHOST, DEFAULT_MAX_REQUESTS_PER_SECOND, DEFAULT_REQUEST_TIMEOUT_SECS,
    MAX_MAX_REQUESTS_PER_SECOND, MAX_REQUEST_TIMEOUT_SECS, MIN_MAX_REQUESTS_PER_SECOND,
    MIN_REQUEST_TIMEOUT_SECS, Section,
};

use serde::Deserialize;

/// Broker management API connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Management API base URL, e.g. http://rabbit:15672
    pub url: String,
    pub username: String,
    /// Admin password. Required; usually supplied through TMQ_BROKER_PASSWORD.
    pub password: Option<String>,
    /// Virtual host all managed users and queues live in
    pub vhost: String,
    /// Per-request timeout; a timeout counts as a transient failure
    pub request_timeout_secs: u64,
    /// Upper bound on management API calls per second from this process
    pub max_requests_per_second: u32,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: String::from(DEFAULT_BROKER_URL),
            username: String::from(DEFAULT_BROKER_USERNAME),
            password: None,
            vhost: String::from(DEFAULT_BROKER_VHOST),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_requests_per_second: DEFAULT_MAX_REQUESTS_PER_SECOND,
        }
    }
}

impl BrokerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ConfigError::invalid(
                Section::Broker,
                format!(
                    "broker.url must be an http(s) URL, got {}",
                    self.url
                ),
            ));
        }

        if self.username.is_empty() {
            return Err(ConfigError::invalid(Section::Broker, "broker.username must not be empty"));
        }

        match self.password.as_deref() {
            None | Some("") => {
                return Err(ConfigError::invalid(
                    Section::Broker,
                    "broker.password is required (set TMQ_BROKER_PASSWORD)",
                ));
            }
            Some(_) => {}
        }

        if self.vhost.is_empty() {
            return Err(ConfigError::invalid(Section::Broker, "broker.vhost must not be empty"));
        }

        if self.request_timeout_secs < MIN_REQUEST_TIMEOUT_SECS
            || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS
        {
            return Err(ConfigError::invalid(
                Section::Broker,
                format!(
                    "broker.request_timeout_secs must be {}-{}, got {}",
                    MIN_REQUEST_TIMEOUT_SECS, MAX_REQUEST_TIMEOUT_SECS, self.request_timeout_secs
                ),
            ));
        }

        if self.max_requests_per_second < MIN_MAX_REQUESTS_PER_SECOND
            || self.max_requests_per_second > MAX_MAX_REQUESTS_PER_SECOND
        {
            return Err(ConfigError::invalid(
                Section::Broker,
                format!(
                    "broker.max_requests_per_second must be {}-{}, got {}",
                    MIN_MAX_REQUESTS_PER_SECOND,
                    MAX_MAX_REQUESTS_PER_SECOND,
                    self.max_requests_per_second
                ),
            ));
        }

        Ok(())
    }
}
