//! Binary runner utilities
//!
//! Start/stop banners and a common run shape for long-running binaries.

use tracing::info;

/// Configuration for running a binary application
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Name of the binary (for logging)
    pub name: String,
    /// How often to log a status line, in seconds
    pub status_interval_secs: u64,
}

impl RunConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status_interval_secs: 60,
        }
    }

    pub fn with_status_interval(mut self, secs: u64) -> Self {
        self.status_interval_secs = secs;
        self
    }
}

/// Trait for long-running binaries
pub trait BinaryRunner {
    /// Run until shutdown
    async fn run(&mut self) -> anyhow::Result<()>;

    fn config(&self) -> &RunConfig;

    /// Summary logged when the binary stops
    fn summary(&self) -> Option<String> {
        None
    }

    fn print_banner(&self) {
        info!("========================================");
        info!("Starting {}", self.config().name);
        info!("Press Ctrl+C to stop");
        info!("========================================");
    }

    fn print_shutdown(&self) {
        info!("========================================");
        info!("{} stopped gracefully", self.config().name);
        if let Some(summary) = self.summary() {
            info!("{}", summary);
        }
        info!("========================================");
    }

    /// Banner, run, shutdown banner
    async fn execute(&mut self) -> anyhow::Result<()> {
        self.print_banner();
        let result = self.run().await;
        self.print_shutdown();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_builder() {
        let config = RunConfig::new("watch").with_status_interval(5);
        assert_eq!(config.name, "watch");
        assert_eq!(config.status_interval_secs, 5);
        assert_eq!(RunConfig::new("default").status_interval_secs, 60);
    }
}
