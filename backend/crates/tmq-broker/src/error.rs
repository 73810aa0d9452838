use error_location::ErrorLocation;
use std::panic::Location;
use thiserror::Error;

/// Errors from the broker management API.
#[derive(Error, Debug)]
pub enum BrokerError {
    /// Worth retrying on a later tick: 5xx, connect failure or timeout.
    #[error("Transient broker error during {operation}: {message} {location}")]
    Transient {
        operation: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Broker rejected {operation} with status {status}: {message} {location}")]
    Rejected {
        operation: String,
        status: u16,
        message: String,
        location: ErrorLocation,
    },

    #[error("HTTP request error: {message} {location}")]
    Http {
        message: String,
        location: ErrorLocation,
        #[source]
        source: reqwest::Error,
    },

    #[error("JSON parse error: {message} {location}")]
    Json {
        message: String,
        location: ErrorLocation,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid broker URL: {message} {location}")]
    Url {
        message: String,
        location: ErrorLocation,
    },
}

impl BrokerError {
    pub fn is_transient(&self) -> bool {
        matches!(self, BrokerError::Transient { .. })
    }

    #[track_caller]
    pub fn transient(operation: impl Into<String>, message: impl Into<String>) -> Self {
        BrokerError::Transient {
            operation: operation.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn rejected(operation: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        BrokerError::Rejected {
            operation: operation.into(),
            status,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn url(message: impl Into<String>) -> Self {
        BrokerError::Url {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Timeouts and connect failures are transient; anything else is a
    /// request that could not be built or sent.
    #[track_caller]
    pub fn from_reqwest(operation: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            return BrokerError::Transient {
                operation: operation.to_string(),
                message: err.to_string(),
                location: ErrorLocation::from(Location::caller()),
            };
        }

        BrokerError::Http {
            message: err.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    }
}

impl From<serde_json::Error> for BrokerError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        BrokerError::Json {
            message: err.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    }
}

pub type Result<T> = std::result::Result<T, BrokerError>;
