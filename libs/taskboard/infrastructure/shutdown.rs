//! Ctrl+C handling for long-running watchers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

/// Shared running flag flipped to `false` on Ctrl+C
///
/// The same flag can be handed to the realtime channel so it closes and
/// stops reconnecting together with the process.
pub struct ShutdownManager {
    flag: Arc<AtomicBool>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn spawn_signal_handler(&self) {
        let flag = Arc::clone(&self.flag);
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                info!("Received shutdown signal (Ctrl+C)");
                flag.store(false, Ordering::Release);
            }
        });
    }

    pub fn is_running(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Stop without a signal
    pub fn trigger(&self) {
        self.flag.store(false, Ordering::Release);
    }

    /// Resolve once shutdown has been requested
    pub async fn wait(&self) {
        let check_interval = Duration::from_millis(50);
        while self.is_running() {
            tokio::time::sleep(check_interval).await;
        }
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}
