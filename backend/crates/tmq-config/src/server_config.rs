use crate::{ConfigError, ConfigErrorResult, DEFAULT_HOST, DEFAULT_PORT, MIN_PORT, Section};

use serde::Deserialize;

/// Where the operator endpoints (`/health`, `/live`, `/metrics`) listen.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    /// 0 lets the OS pick a free port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from(DEFAULT_HOST),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::invalid(
                Section::Server,
                "server.host must not be empty",
            ));
        }

        if (1..MIN_PORT).contains(&self.port) {
            return Err(ConfigError::invalid(
                Section::Server,
                format!(
                    "server.port {} is privileged; use 0 or a port >= {}",
                    self.port, MIN_PORT
                ),
            ));
        }

        Ok(())
    }
}
