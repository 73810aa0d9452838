mod broker_config;
mod config;
mod database_config;
mod error;
mod log_level;
mod logging_config;
mod monitor_config;
mod namespace_config;
mod scheduler_config;
mod server_config;

#[cfg(test)]
mod tests;

pub use broker_config::BrokerConfig;
pub use config::Config;
pub use database_config::DatabaseConfig;
pub use error::{ConfigError, ConfigErrorResult, Section};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use monitor_config::MonitorConfig;
pub use namespace_config::NamespaceConfig;
pub use scheduler_config::SchedulerConfig;
pub use server_config::ServerConfig;

const CONFIG_DIR_ENV: &str = "TMQ_CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = ".tmq";
const CONFIG_FILENAME: &str = "config.toml";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 9090;
const MIN_PORT: u16 = 1024;

const DEFAULT_DATABASE_FILENAME: &str = "tenantmq.db";

const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";

const DEFAULT_BROKER_URL: &str = "http://127.0.0.1:15672";
const DEFAULT_BROKER_USERNAME: &str = "guest";
const DEFAULT_BROKER_VHOST: &str = "/";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_REQUESTS_PER_SECOND: u32 = 50;
const MIN_MAX_REQUESTS_PER_SECOND: u32 = 1;
const MAX_MAX_REQUESTS_PER_SECOND: u32 = 10_000;

const DEFAULT_NAMESPACE_PREFIX: &str = "tc-";
const DEFAULT_PERMISSION_TEMPLATE: &str = "^(queue/{{namespace}}/.*|exchange/{{namespace}}/.*)";
const DEFAULT_ROTATION_INTERVAL_SECS: u64 = 3600;
const MIN_ROTATION_INTERVAL_SECS: u64 = 60;
const MAX_ROTATION_INTERVAL_SECS: u64 = 31_536_000;
const DEFAULT_EXPIRATION_DELAY_SECS: u64 = 86_400;
const MAX_EXPIRATION_DELAY_SECS: u64 = 94_608_000;

const DEFAULT_QUEUE_PREFIX: &str = "queue/";
const DEFAULT_EXCHANGE_PREFIX: &str = "exchange/";
const DEFAULT_ALERT_THRESHOLD: u64 = 5_000;
const DEFAULT_DELETE_THRESHOLD: u64 = 50_000;
const DEFAULT_CONNECTION_MAX_LIFETIME_SECS: u64 = 3600;
const MAX_CONNECTION_MAX_LIFETIME_SECS: u64 = 2_592_000;
const DEFAULT_QUEUE_EXPIRATION_DELAY_SECS: u64 = 86_400;
const MAX_QUEUE_EXPIRATION_DELAY_SECS: u64 = 2_592_000;

const DEFAULT_ITERATION_LENGTH_SECS: u64 = 15;
const MIN_ITERATION_LENGTH_SECS: u64 = 1;
const MAX_ITERATION_LENGTH_SECS: u64 = 3600;
const DEFAULT_ITERATION_GAP_SECS: u64 = 0;
const MAX_ITERATION_GAP_SECS: u64 = 3600;
const DEFAULT_ITERATION_FAILURES: u32 = 5;
const MIN_ITERATION_FAILURES: u32 = 1;
const MAX_ITERATION_FAILURES: u32 = 100;
const DEFAULT_MAX_CONCURRENCY: usize = 8;
const MIN_MAX_CONCURRENCY: usize = 1;
const MAX_MAX_CONCURRENCY: usize = 256;
const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 10;
