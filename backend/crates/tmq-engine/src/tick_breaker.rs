use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    /// Ticks run normally
    Closed,
    /// Too many consecutive failed ticks; rotation halted until reset
    Tripped,
}

/// Consecutive failed-tick counter.
///
/// Unlike a request circuit breaker there is no automatic half-open probe:
/// once tripped it stays tripped until an operator restarts the process or
/// calls [`TickBreaker::reset`].
pub struct TickBreaker {
    threshold: u32,
    state: RwLock<BreakerState>,
    consecutive_failures: AtomicU32,
}

impl TickBreaker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            state: RwLock::new(BreakerState::Closed),
            consecutive_failures: AtomicU32::new(0),
        }
    }

    pub fn record_success(&self) {
        if self.state() == BreakerState::Closed {
            self.consecutive_failures.store(0, Ordering::SeqCst);
        }
    }

    /// Returns the state after counting this failure.
    pub fn record_failure(&self) -> BreakerState {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;

        if failures >= self.threshold {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            if *state == BreakerState::Closed {
                *state = BreakerState::Tripped;
                log::error!(
                    "Tick breaker TRIPPED after {} consecutive failed ticks",
                    failures
                );
            }
            return BreakerState::Tripped;
        }

        BreakerState::Closed
    }

    pub fn reset(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        *state = BreakerState::Closed;
        self.consecutive_failures.store(0, Ordering::SeqCst);
        log::info!("Tick breaker reset");
    }

    pub fn state(&self) -> BreakerState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_tripped(&self) -> bool {
        self.state() == BreakerState::Tripped
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}
