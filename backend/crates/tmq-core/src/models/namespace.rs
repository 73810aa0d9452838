use crate::{CoreError, CoreResult};

use std::panic::Location;

use chrono::{DateTime, Duration, Utc};
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

pub const MAX_NAMESPACE_NAME_LENGTH: usize = 64;

/// A tenant's access scope on the shared broker.
///
/// The broker username is the namespace name, so there is never more than one
/// live broker user per namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    pub created: DateTime<Utc>,
    /// Rotation deadline. Strictly increases on every successful rotation.
    pub expires: DateTime<Utc>,
    /// Optimistic-lock token for compare-and-swap writes.
    pub rotation_version: i64,
    pub contact: Option<String>,
}

impl Namespace {
    #[track_caller]
    pub fn new(
        name: impl Into<String>,
        created: DateTime<Utc>,
        expires: DateTime<Utc>,
        contact: Option<String>,
    ) -> CoreResult<Self> {
        let name = name.into();
        Self::validate_name(&name)?;

        if expires < created {
            return Err(CoreError::Validation {
                message: format!("namespace {name} expires before it was created"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self {
            name,
            created,
            expires,
            rotation_version: 0,
            contact,
        })
    }

    /// Names may only contain ASCII alphanumerics, `-` and `_`.
    ///
    /// Keeping regex metacharacters and `/` out of names is what lets a
    /// templated permission pattern stay inside its own namespace.
    #[track_caller]
    pub fn validate_name(name: &str) -> CoreResult<()> {
        let valid = !name.is_empty()
            && name.len() <= MAX_NAMESPACE_NAME_LENGTH
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if valid {
            Ok(())
        } else {
            Err(CoreError::InvalidNamespaceName {
                value: name.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }

    /// `false` when `now - grace` falls before the earliest representable
    /// instant, since nothing can have expired before that.
    pub fn is_past_grace(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        now.checked_sub_signed(grace).is_some_and(|cutoff| self.expires < cutoff)
    }

    /// The deadline after one more rotation: the old deadline pushed forward
    /// by `interval`, or `now + interval` when that would still be in the past.
    #[track_caller]
    pub fn next_expiry(
        &self,
        now: DateTime<Utc>,
        interval: Duration,
    ) -> CoreResult<DateTime<Utc>> {
        let next = self.expires.checked_add_signed(interval).and_then(|advanced| {
            if advanced > now {
                Some(advanced)
            } else {
                now.checked_add_signed(interval)
            }
        });

        match next {
            Some(expires) => Ok(expires),
            None => Err(CoreError::TimeOverflow {
                message: format!(
                    "expiry of {} pushed {}s past {}",
                    self.name,
                    interval.num_seconds(),
                    self.expires.max(now).to_rfc3339()
                ),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Copy of this record as it should look after a successful rotation.
    #[track_caller]
    pub fn rotated(&self, now: DateTime<Utc>, interval: Duration) -> CoreResult<Self> {
        Ok(Self {
            expires: self.next_expiry(now, interval)?,
            rotation_version: self.rotation_version + 1,
            ..self.clone()
        })
    }
}
