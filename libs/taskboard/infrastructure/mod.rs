//! Infrastructure Layer
//!
//! REST and realtime clients, configuration, logging and shutdown.

pub mod client;
pub mod config;
pub mod logging;
pub mod shutdown;

pub use client::{ApiClient, ApiError, BoardChannel, ChannelSettings, SyncMode, TokenStore};
pub use config::{ConfigError, TaskboardConfig};
pub use logging::{init_tracing, init_tracing_with_level};
pub use shutdown::ShutdownManager;
