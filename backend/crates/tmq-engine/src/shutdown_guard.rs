use crate::ShutdownCoordinator;

use tokio::sync::watch;

/// One subscriber's view of [`ShutdownCoordinator`].
pub struct ShutdownGuard {
    stop_rx: watch::Receiver<bool>,
}

impl ShutdownGuard {
    pub fn new(coordinator: &ShutdownCoordinator) -> Self {
        Self {
            stop_rx: coordinator.subscribe(),
        }
    }

    /// Resolves once shutdown has been requested, including before this
    /// guard existed. Cancel-safe.
    pub async fn wait(&mut self) {
        // Err: every coordinator was dropped
        let _ = self.stop_rx.wait_for(|stopped| *stopped).await;
    }

    pub fn is_shutdown(&self) -> bool {
        *self.stop_rx.borrow()
    }
}
