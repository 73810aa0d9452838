use std::fmt;

use serde::{Deserialize, Serialize};

/// Deduplication key for alerts: one per namespace and queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertKey {
    pub namespace: String,
    pub queue_name: String,
}

impl AlertKey {
    pub fn new(namespace: impl Into<String>, queue_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            queue_name: queue_name.into(),
        }
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.queue_name)
    }
}
