//! Broker users under the managed prefix that have no store record.
//!
//! Reclaim only sees namespaces that are still in the store. A record that
//! disappears some other way leaves its broker user behind, so every tick
//! also compares the broker's user list with the store.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};

/// Deadline bookkeeping for orphaned broker users.
///
/// For every managed name the sweep remembers the last `expires` it saw in
/// the store. A user whose record is gone becomes purgeable once that
/// deadline plus the grace period has passed. Users never seen in the store
/// start from the moment they were first noticed.
#[derive(Debug, Default)]
pub struct UserSweep {
    deadlines: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl UserSweep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe_record(&self, name: &str, expires: DateTime<Utc>) {
        self.lock().insert(name.to_string(), expires);
    }

    /// Broker users to purge now.
    ///
    /// `users` is the broker's current list of managed users and `recorded`
    /// the names present in the store. Bookkeeping for names that appear in
    /// neither is dropped.
    pub fn due_for_purge(
        &self,
        users: &[String],
        recorded: &HashSet<String>,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Vec<String> {
        let mut deadlines = self.lock();
        let live: HashSet<&str> = users.iter().map(String::as_str).collect();
        deadlines.retain(|name, _| live.contains(name.as_str()) || recorded.contains(name));

        users
            .iter()
            .filter(|user| !recorded.contains(*user))
            .filter(|user| {
                let last_known = *deadlines.entry((*user).clone()).or_insert(now);
                now.checked_sub_signed(grace).is_some_and(|cutoff| last_known < cutoff)
            })
            .cloned()
            .collect()
    }

    pub fn forget(&self, name: &str) {
        self.lock().remove(name);
    }

    pub fn tracked(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.deadlines.lock().unwrap_or_else(|e| e.into_inner())
    }
}
