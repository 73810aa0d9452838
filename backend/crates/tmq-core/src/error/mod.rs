use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid namespace name: {value} {location}")]
    InvalidNamespaceName {
        value: String,
        location: ErrorLocation,
    },

    #[error("Invalid permission template {template:?}: {message} {location}")]
    Template {
        template: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Timestamp out of range: {message} {location}")]
    TimeOverflow {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid queue classification: {value} {location}")]
    InvalidClassification {
        value: String,
        location: ErrorLocation,
    },

    #[error("Invalid resource kind: {value} {location}")]
    InvalidResourceKind {
        value: String,
        location: ErrorLocation,
    },
}

pub type Result<T> = StdResult<T, CoreError>;
