pub mod alert_sink;
pub mod alerter;
pub mod error;
pub mod metrics;
pub mod namespace_manager;
pub mod queue_monitor;
pub mod scheduler;
pub mod settings;
pub mod shutdown_coordinator;
pub mod shutdown_guard;
pub mod tick_breaker;
pub mod tick_report;
pub mod user_sweep;

#[cfg(test)]
mod tests;

pub use alert_sink::{AlertEvent, AlertSink, LogAlertSink};
pub use alerter::Alerter;
pub use error::{EngineError, Result as EngineResult};
pub use metrics::Metrics;
pub use namespace_manager::{NamespaceManager, ReclaimOutcome, RotationOutcome};
pub use queue_monitor::{QueueMonitor, QueueReport, classify};
pub use scheduler::{Scheduler, SchedulerHealth};
pub use settings::{EngineSettings, MonitorSettings, NamespaceSettings, SchedulerSettings};
pub use shutdown_coordinator::ShutdownCoordinator;
pub use shutdown_guard::ShutdownGuard;
pub use tick_breaker::{BreakerState, TickBreaker};
pub use tick_report::TickReport;
pub use user_sweep::UserSweep;
