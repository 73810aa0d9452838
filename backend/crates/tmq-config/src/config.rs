use crate::{
    BrokerConfig, CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError, ConfigErrorResult,
    DEFAULT_CONFIG_DIR, DatabaseConfig, LoggingConfig, MonitorConfig, NamespaceConfig,
    SchedulerConfig, Section, ServerConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub broker: BrokerConfig,
    pub namespaces: NamespaceConfig,
    pub monitor: MonitorConfig,
    pub scheduler: SchedulerConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. Check for TMQ_CONFIG_DIR env var, else use ./.tmq/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply TMQ_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: TMQ_CONFIG_DIR env var > ./.tmq/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir().map_err(|e| ConfigError::Io {
            path: PathBuf::from("."),
            source: e,
        })?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Validate all configuration. Any error here is fatal at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.database.validate()?;
        self.broker.validate()?;
        self.namespaces.validate()?;
        self.monitor.validate()?;
        self.scheduler.validate()?;

        self.validate_isolation()?;

        Ok(())
    }

    /// Rendered permission rules for two sibling namespaces must not reach
    /// each other's queues or exchanges.
    fn validate_isolation(&self) -> ConfigErrorResult<()> {
        let templates = self.namespaces.permission_templates()?;
        let owner = format!("{}probe", self.namespaces.prefix);
        let siblings = [
            format!("{}probe-sibling", self.namespaces.prefix),
            format!("{}other", self.namespaces.prefix),
        ];

        let rule = templates.render(&owner)?;
        for sibling in &siblings {
            if rule.grants_foreign_access(
                sibling,
                &self.monitor.queue_prefix,
                &self.monitor.exchange_prefix,
            )? {
                return Err(ConfigError::invalid(
                    Section::Namespaces,
                    format!(
                        "permission templates for {} also grant access to {}'s resources",
                        owner, sibling
                    ),
                ));
            }
        }

        if !rule.grants_foreign_access(
            &owner,
            &self.monitor.queue_prefix,
            &self.monitor.exchange_prefix,
        )? {
            return Err(ConfigError::invalid(
                Section::Namespaces,
                format!(
                    "permission templates grant {} no access to its own {}/{} resources",
                    owner, self.monitor.queue_prefix, self.monitor.exchange_prefix
                ),
            ));
        }

        Ok(())
    }

    /// Get absolute path to database file.
    pub fn database_path(&self) -> ConfigErrorResult<PathBuf> {
        let config_dir = Self::config_dir()?;
        Ok(config_dir.join(&self.database.path))
    }

    /// Get bind address as string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Log configuration summary (NEVER logs secrets).
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!("  server: {}:{}", self.server.host, self.server.port);
        info!("  database: {}", self.database.path);
        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
        info!(
            "  broker: {} as {} on vhost {:?} (timeout={}s, max {}/s)",
            self.broker.url,
            self.broker.username,
            self.broker.vhost,
            self.broker.request_timeout_secs,
            self.broker.max_requests_per_second
        );
        info!(
            "  namespaces: prefix={:?}, rotation={}s, grace={}s, tags={:?}",
            self.namespaces.prefix,
            self.namespaces.rotation_interval_secs,
            self.namespaces.expiration_delay_secs,
            self.namespaces.user_tags
        );
        info!(
            "  monitor: alert>={}, delete>={}, orphan_after={}s, suppress={}s",
            self.monitor.alert_threshold,
            self.monitor.delete_threshold,
            self.monitor.connection_max_lifetime_secs,
            self.monitor.queue_expiration_delay_secs
        );
        info!(
            "  scheduler: every {}s (+{}s gap), halt after {} failed ticks, {} workers, op timeout {}s",
            self.scheduler.iteration_length_secs,
            self.scheduler.iteration_gap_secs,
            self.scheduler.iteration_failures,
            self.scheduler.max_concurrency,
            self.scheduler.operation_timeout_secs
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("TMQ_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("TMQ_SERVER_PORT", &mut self.server.port);

        // Database
        Self::apply_env_string("TMQ_DATABASE_PATH", &mut self.database.path);

        // Logging
        Self::apply_env_parse("TMQ_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("TMQ_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("TMQ_LOG_FILE", &mut self.logging.file);

        // Broker
        Self::apply_env_string("TMQ_BROKER_URL", &mut self.broker.url);
        Self::apply_env_string("TMQ_BROKER_USERNAME", &mut self.broker.username);
        Self::apply_env_option_string("TMQ_BROKER_PASSWORD", &mut self.broker.password);
        Self::apply_env_string("TMQ_BROKER_VHOST", &mut self.broker.vhost);
        Self::apply_env_parse(
            "TMQ_BROKER_REQUEST_TIMEOUT_SECS",
            &mut self.broker.request_timeout_secs,
        );
        Self::apply_env_parse(
            "TMQ_BROKER_MAX_REQUESTS_PER_SECOND",
            &mut self.broker.max_requests_per_second,
        );

        // Namespaces
        Self::apply_env_string("TMQ_NAMESPACE_PREFIX", &mut self.namespaces.prefix);
        Self::apply_env_parse(
            "TMQ_NAMESPACE_ROTATION_INTERVAL_SECS",
            &mut self.namespaces.rotation_interval_secs,
        );
        Self::apply_env_parse(
            "TMQ_NAMESPACE_EXPIRATION_DELAY_SECS",
            &mut self.namespaces.expiration_delay_secs,
        );
        Self::apply_env_string(
            "TMQ_USER_CONFIG_PERMISSION",
            &mut self.namespaces.user_config_permission,
        );
        Self::apply_env_string(
            "TMQ_USER_WRITE_PERMISSION",
            &mut self.namespaces.user_write_permission,
        );
        Self::apply_env_string(
            "TMQ_USER_READ_PERMISSION",
            &mut self.namespaces.user_read_permission,
        );
        Self::apply_env_list("TMQ_USER_TAGS", &mut self.namespaces.user_tags);

        // Monitor
        Self::apply_env_string("TMQ_QUEUE_PREFIX", &mut self.monitor.queue_prefix);
        Self::apply_env_string("TMQ_EXCHANGE_PREFIX", &mut self.monitor.exchange_prefix);
        Self::apply_env_parse("TMQ_ALERT_THRESHOLD", &mut self.monitor.alert_threshold);
        Self::apply_env_parse("TMQ_DELETE_THRESHOLD", &mut self.monitor.delete_threshold);
        Self::apply_env_parse(
            "TMQ_CONNECTION_MAX_LIFETIME_SECS",
            &mut self.monitor.connection_max_lifetime_secs,
        );
        Self::apply_env_parse(
            "TMQ_MESSAGE_COUNT_TOLERANCE",
            &mut self.monitor.message_count_tolerance,
        );
        Self::apply_env_parse(
            "TMQ_MESSAGE_PUBLISH_RATE_TOLERANCE",
            &mut self.monitor.message_publish_rate_tolerance,
        );
        Self::apply_env_parse(
            "TMQ_QUEUE_EXPIRATION_DELAY_SECS",
            &mut self.monitor.queue_expiration_delay_secs,
        );

        // Scheduler
        Self::apply_env_parse(
            "TMQ_ITERATION_LENGTH_SECS",
            &mut self.scheduler.iteration_length_secs,
        );
        Self::apply_env_parse(
            "TMQ_ITERATION_GAP_SECS",
            &mut self.scheduler.iteration_gap_secs,
        );
        Self::apply_env_parse(
            "TMQ_ITERATION_FAILURES",
            &mut self.scheduler.iteration_failures,
        );
        Self::apply_env_parse("TMQ_MAX_CONCURRENCY", &mut self.scheduler.max_concurrency);
        Self::apply_env_parse(
            "TMQ_OPERATION_TIMEOUT_SECS",
            &mut self.scheduler.operation_timeout_secs,
        );
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }

    /// Helper: Apply comma-separated environment variable override for lists
    fn apply_env_list(var_name: &str, target: &mut Vec<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    }
}
