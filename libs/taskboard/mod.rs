//! Taskboard client
//!
//! Client library for a Kanban board service: boards, columns, tasks,
//! members, notifications, `@`-mentions and board analytics.
//!
//! - `domain`: entities and pure presentation logic
//! - `application`: the client-side store and the board session facade
//! - `infrastructure`: REST client, realtime channel, config, logging

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{BoardSession, BoardStore, SharedStore, StoreEvent, StoreListener};
pub use domain::{Board, BoardAnalytics, Column, Notification, NotificationCenter, Priority, Task, TaskStatus, User};
pub use infrastructure::client::api::{
    ApiClient, ApiError, FileTokenStore, LoggingNavigator, MemoryTokenStore, Navigator, RecordingNavigator,
    TokenStore, LOGIN_ROUTE,
};
pub use infrastructure::client::realtime::{connect as connect_realtime, BoardChannel, ChannelSettings, SyncMode};
pub use infrastructure::{init_tracing, init_tracing_with_level, ShutdownManager, TaskboardConfig};
