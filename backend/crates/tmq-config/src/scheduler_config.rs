use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_ITERATION_FAILURES, DEFAULT_ITERATION_GAP_SECS,
    DEFAULT_ITERATION_LENGTH_SECS, DEFAULT_MAX_CONCURRENCY, DEFAULT_OPERATION_TIMEOUT_SECS,
    MAX_ITERATION_FAILURES, MAX_ITERATION_GAP_SECS, MAX_ITERATION_LENGTH_SECS, MAX_MAX_CONCURRENCY,
    MIN_ITERATION_FAILURES, MIN_ITERATION_LENGTH_SECS, MIN_MAX_CONCURRENCY, Section,
};

use serde::Deserialize;

/// Tick driver settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Tick period, and the deadline for a single tick
    pub iteration_length_secs: u64,
    /// Extra pause after each tick completes
    pub iteration_gap_secs: u64,
    /// Consecutive failed ticks before rotation halts
    pub iteration_failures: u32,
    /// Worker-pool size for per-namespace and per-queue operations
    pub max_concurrency: usize,
    /// Deadline for one per-namespace or per-queue operation
    pub operation_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            iteration_length_secs: DEFAULT_ITERATION_LENGTH_SECS,
            iteration_gap_secs: DEFAULT_ITERATION_GAP_SECS,
            iteration_failures: DEFAULT_ITERATION_FAILURES,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.iteration_length_secs < MIN_ITERATION_LENGTH_SECS
            || self.iteration_length_secs > MAX_ITERATION_LENGTH_SECS
        {
            return Err(ConfigError::invalid(
                Section::Scheduler,
                format!(
                    "scheduler.iteration_length_secs must be {}-{}, got {}",
                    MIN_ITERATION_LENGTH_SECS, MAX_ITERATION_LENGTH_SECS, self.iteration_length_secs
                ),
            ));
        }

        if self.iteration_gap_secs > MAX_ITERATION_GAP_SECS {
            return Err(ConfigError::invalid(
                Section::Scheduler,
                format!(
                    "scheduler.iteration_gap_secs must be 0-{}, got {}",
                    MAX_ITERATION_GAP_SECS, self.iteration_gap_secs
                ),
            ));
        }

        if self.iteration_failures < MIN_ITERATION_FAILURES
            || self.iteration_failures > MAX_ITERATION_FAILURES
        {
            return Err(ConfigError::invalid(
                Section::Scheduler,
                format!(
                    "scheduler.iteration_failures must be {}-{}, got {}",
                    MIN_ITERATION_FAILURES, MAX_ITERATION_FAILURES, self.iteration_failures
                ),
            ));
        }

        if self.max_concurrency < MIN_MAX_CONCURRENCY || self.max_concurrency > MAX_MAX_CONCURRENCY
        {
            return Err(ConfigError::invalid(
                Section::Scheduler,
                format!(
                    "scheduler.max_concurrency must be {}-{}, got {}",
                    MIN_MAX_CONCURRENCY, MAX_MAX_CONCURRENCY, self.max_concurrency
                ),
            ));
        }

        if self.operation_timeout_secs == 0
            || self.operation_timeout_secs > self.iteration_length_secs
        {
            return Err(ConfigError::invalid(
                Section::Scheduler,
                format!(
                    "scheduler.operation_timeout_secs must be 1-{} (iteration_length_secs), got {}",
                    self.iteration_length_secs, self.operation_timeout_secs
                ),
            ));
        }

        Ok(())
    }
}
