use crate::ShutdownCoordinator;

use tokio::sync::broadcast;

/// Lets a background task wait for shutdown
pub struct ShutdownGuard {
    shutdown_rx: broadcast::Receiver<()>,
    coordinator: ShutdownCoordinator,
}

impl ShutdownGuard {
    pub fn new(coordinator: &ShutdownCoordinator) -> Self {
        // subscribe before any flag check so a concurrent trigger is not missed
        Self {
            shutdown_rx: coordinator.subscribe(),
            coordinator: coordinator.clone(),
        }
    }

    /// Wait for shutdown signal. Returns at once if it already fired.
    pub async fn wait(&mut self) {
        if self.coordinator.is_shutdown() {
            return;
        }
        let _ = self.shutdown_rx.recv().await;
    }

    /// Non-blocking check
    pub fn poll_shutdown(&mut self) -> bool {
        self.coordinator.is_shutdown() || self.shutdown_rx.try_recv().is_ok()
    }
}
