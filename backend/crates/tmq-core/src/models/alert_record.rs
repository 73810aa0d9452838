use crate::AlertKey;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub key: AlertKey,
    pub last_alert_at: DateTime<Utc>,
}
