pub mod alert_repository;
pub mod namespace_repository;

use crate::{DbError, Result as DbErrorResult};

use std::panic::Location;

use chrono::{DateTime, Utc};
use error_location::ErrorLocation;

#[track_caller]
pub(crate) fn from_millis(millis: i64, column: &'static str) -> DbErrorResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| DbError::Timestamp {
        column,
        millis,
        location: ErrorLocation::from(Location::caller()),
    })
}
