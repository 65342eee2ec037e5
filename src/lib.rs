//! Taskboard client - main library
//!
//! ## Architecture
//!
//! - **bin_common**: shared utilities for binary executables (CLI, runners)
//! - **taskboard**: board client logic (re-exported from workspace)
//! - **realtime**: WebSocket channel library (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust,ignore
//! use taskboard_client::bin_common::{load_config_from_env, ConfigType};
//! use taskboard_client::taskboard::TaskboardConfig;
//! ```

// Re-export workspace libraries for convenience
pub use realtime;
pub use taskboard;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{load_config_from_env, parse_args, ConfigType};
    pub use runner::{BinaryRunner, RunConfig};
}
