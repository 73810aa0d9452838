use std::fmt;
use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error as ThisError;

/// Config section a validation failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Environment,
    Server,
    Database,
    Broker,
    Namespaces,
    Monitor,
    Scheduler,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Environment => "environment",
            Self::Server => "server",
            Self::Database => "database",
            Self::Broker => "broker",
            Self::Namespaces => "namespaces",
            Self::Monitor => "monitor",
            Self::Scheduler => "scheduler",
        })
    }
}

#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("Invalid {section} config: {message} {location}")]
    Invalid {
        section: Section,
        message: String,
        location: ErrorLocation,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Permission template error: {source}")]
    Template {
        #[source]
        source: tmq_core::CoreError,
    },
}

impl ConfigError {
    #[track_caller]
    pub fn invalid(section: Section, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            section,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Section at fault, for validation failures
    pub fn section(&self) -> Option<Section> {
        match self {
            ConfigError::Invalid { section, .. } => Some(*section),
            _ => None,
        }
    }
}

impl From<tmq_core::CoreError> for ConfigError {
    fn from(source: tmq_core::CoreError) -> Self {
        ConfigError::Template { source }
    }
}

pub type ConfigErrorResult<T> = Result<T, ConfigError>;
