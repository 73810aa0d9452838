use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_EXPIRATION_DELAY_SECS, DEFAULT_NAMESPACE_PREFIX,
    DEFAULT_PERMISSION_TEMPLATE, DEFAULT_ROTATION_INTERVAL_SECS, MAX_EXPIRATION_DELAY_SECS,
    MAX_ROTATION_INTERVAL_SECS, MIN_ROTATION_INTERVAL_SECS, Section,
};

use tmq_core::{Namespace, PermissionTemplates};

use serde::Deserialize;

/// Namespace lifecycle settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    /// Only namespaces whose name starts with this prefix are managed
    pub prefix: String,
    /// How far each rotation pushes `expires` forward
    pub rotation_interval_secs: u64,
    /// Grace period after `expires` before a namespace is reclaimed
    pub expiration_delay_secs: u64,
    pub user_config_permission: String,
    pub user_write_permission: String,
    pub user_read_permission: String,
    pub user_tags: Vec<String>,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            prefix: String::from(DEFAULT_NAMESPACE_PREFIX),
            rotation_interval_secs: DEFAULT_ROTATION_INTERVAL_SECS,
            expiration_delay_secs: DEFAULT_EXPIRATION_DELAY_SECS,
            user_config_permission: String::from(DEFAULT_PERMISSION_TEMPLATE),
            user_write_permission: String::from(DEFAULT_PERMISSION_TEMPLATE),
            user_read_permission: String::from(DEFAULT_PERMISSION_TEMPLATE),
            user_tags: Vec::new(),
        }
    }
}

impl NamespaceConfig {
    pub fn permission_templates(&self) -> ConfigErrorResult<PermissionTemplates> {
        Ok(PermissionTemplates::new(
            self.user_config_permission.as_str(),
            self.user_write_permission.as_str(),
            self.user_read_permission.as_str(),
        )?)
    }

    /// Validates the namespace section on its own. Cross-section checks
    /// (templates against queue/exchange prefixes) live in `Config::validate`.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.prefix.is_empty() {
            return Err(ConfigError::invalid(
                Section::Namespaces,
                "namespaces.prefix must not be empty",
            ));
        }

        Namespace::validate_name(&self.prefix).map_err(|_| {
            ConfigError::invalid(
                Section::Namespaces,
                format!(
                    "namespaces.prefix may only contain [A-Za-z0-9_-], got {}",
                    self.prefix
                ),
            )
        })?;

        if self.rotation_interval_secs < MIN_ROTATION_INTERVAL_SECS
            || self.rotation_interval_secs > MAX_ROTATION_INTERVAL_SECS
        {
            return Err(ConfigError::invalid(
                Section::Namespaces,
                format!(
                    "namespaces.rotation_interval_secs must be {}-{}, got {}",
                    MIN_ROTATION_INTERVAL_SECS,
                    MAX_ROTATION_INTERVAL_SECS,
                    self.rotation_interval_secs
                ),
            ));
        }

        if self.expiration_delay_secs < self.rotation_interval_secs {
            return Err(ConfigError::invalid(
                Section::Namespaces,
                format!(
                    "namespaces.expiration_delay_secs ({}) must be >= rotation_interval_secs ({})",
                    self.expiration_delay_secs, self.rotation_interval_secs
                ),
            ));
        }

        if self.expiration_delay_secs > MAX_EXPIRATION_DELAY_SECS {
            return Err(ConfigError::invalid(
                Section::Namespaces,
                format!(
                    "namespaces.expiration_delay_secs must be <= {}, got {}",
                    MAX_EXPIRATION_DELAY_SECS, self.expiration_delay_secs
                ),
            ));
        }

        if self.user_tags.iter().any(|t| t.is_empty() || t.contains(',')) {
            return Err(ConfigError::invalid(
                Section::Namespaces,
                "namespaces.user_tags entries must be non-empty and contain no ','",
            ));
        }

        self.permission_templates()?;

        Ok(())
    }
}
