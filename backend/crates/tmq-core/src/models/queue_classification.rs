use crate::{CoreError, CoreResult};

use std::panic::Location;
use std::str::FromStr;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Outcome of classifying one queue or exchange during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueueClassification {
    #[default]
    Healthy,
    /// Backlog at or over the alert threshold
    Alert,
    /// Backlog at or over the delete threshold, or orphaned long enough
    Delete,
}

impl QueueClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Alert => "alert",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for QueueClassification {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "healthy" => Ok(Self::Healthy),
            "alert" => Ok(Self::Alert),
            "delete" => Ok(Self::Delete),
            _ => Err(CoreError::InvalidClassification {
                value: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
