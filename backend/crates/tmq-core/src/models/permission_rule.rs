use crate::{CoreError, CoreResult};

use std::panic::Location;

use error_location::ErrorLocation;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Broker permission triple for one user on the managed virtual host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRule {
    pub configure: String,
    pub write: String,
    pub read: String,
}

impl PermissionRule {
    /// True when any of the three patterns would match a queue or exchange
    /// owned by `other_namespace`.
    #[track_caller]
    pub fn grants_foreign_access(
        &self,
        other_namespace: &str,
        queue_prefix: &str,
        exchange_prefix: &str,
    ) -> CoreResult<bool> {
        let probes = [
            format!("{queue_prefix}{other_namespace}/probe"),
            format!("{exchange_prefix}{other_namespace}/probe"),
        ];

        for pattern in [&self.configure, &self.write, &self.read] {
            let regex = Regex::new(pattern).map_err(|e| CoreError::Template {
                template: pattern.clone(),
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

            if probes.iter().any(|probe| regex.is_match(probe)) {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
