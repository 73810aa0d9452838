use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of a queue's depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub queue_name: String,
    pub namespace: String,
    pub message_count: u64,
    pub observed_at: DateTime<Utc>,
}

impl QueueSnapshot {
    /// Growth rate in messages per second since `previous`.
    ///
    /// `None` when the two observations are not strictly ordered in time.
    pub fn rate_since(&self, previous: &QueueSnapshot) -> Option<f64> {
        let elapsed_ms = (self.observed_at - previous.observed_at).num_milliseconds();
        if elapsed_ms <= 0 {
            return None;
        }

        let delta = self.message_count as f64 - previous.message_count as f64;
        Some(delta / (elapsed_ms as f64 / 1000.0))
    }
}
