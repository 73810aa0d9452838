use tmq_broker::BrokerError;
use tmq_core::CoreError;
use tmq_db::DbError;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Broker error: {source} {location}")]
    Broker {
        #[source]
        source: BrokerError,
        location: ErrorLocation,
    },

    #[error("Store error: {source} {location}")]
    Db {
        #[source]
        source: DbError,
        location: ErrorLocation,
    },

    #[error("{source} {location}")]
    Core {
        #[source]
        source: CoreError,
        location: ErrorLocation,
    },

    #[error("{operation} timed out after {timeout_ms}ms {location}")]
    Timeout {
        operation: String,
        timeout_ms: u128,
        location: ErrorLocation,
    },

    #[error("Validation failed: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error("Rotation halted after {consecutive} consecutive failed ticks {location}")]
    RepeatedTickFailure {
        consecutive: u32,
        location: ErrorLocation,
    },
}

impl EngineError {
    /// Failures expected to clear up by the next tick.
    pub fn is_transient(&self) -> bool {
        match self {
            EngineError::Broker { source, .. } => source.is_transient(),
            EngineError::Timeout { .. } => true,
            _ => false,
        }
    }

    #[track_caller]
    pub fn timeout(operation: impl Into<String>, timeout: std::time::Duration) -> Self {
        EngineError::Timeout {
            operation: operation.into(),
            timeout_ms: timeout.as_millis(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<BrokerError> for EngineError {
    #[track_caller]
    fn from(source: BrokerError) -> Self {
        EngineError::Broker {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<DbError> for EngineError {
    #[track_caller]
    fn from(source: DbError) -> Self {
        EngineError::Db {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<CoreError> for EngineError {
    #[track_caller]
    fn from(source: CoreError) -> Self {
        EngineError::Core {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
