use crate::{ConfigError, ConfigErrorResult, DEFAULT_DATABASE_FILENAME, Section};

use std::path::{Component, Path};

use serde::Deserialize;

/// Namespace and alert-suppression store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file, resolved under the config directory
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: String::from(DEFAULT_DATABASE_FILENAME),
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let path = Path::new(&self.path);

        if self.path.is_empty() {
            return Err(ConfigError::invalid(
                Section::Database,
                "database.path must name a file",
            ));
        }

        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || self.path.contains("..") {
            return Err(ConfigError::invalid(
                Section::Database,
                format!(
                    "database.path {:?} must stay inside the config directory (relative, no '..')",
                    self.path
                ),
            ));
        }

        Ok(())
    }
}
