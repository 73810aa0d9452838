use crate::ShutdownGuard;

use std::sync::Arc;

use log::info;
use tokio::sync::watch;

/// Process-wide stop flag shared by the scheduler and the HTTP server.
///
/// The flag is sticky: a guard created after `shutdown()` was called
/// resolves immediately.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    stop_tx: Arc<watch::Sender<bool>>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            stop_tx: Arc::new(stop_tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.stop_tx.subscribe()
    }

    pub fn shutdown(&self) {
        if !self.stop_tx.send_replace(true) {
            info!("Shutdown requested, stopping scheduler and server");
        }
    }

    pub fn is_shutdown(&self) -> bool {
        *self.stop_tx.borrow()
    }

    pub fn subscribe_guard(&self) -> ShutdownGuard {
        ShutdownGuard::new(self)
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
