//! Clients for the board backend: REST API and realtime channel

pub mod api;
pub mod realtime;

pub use api::{ApiClient, ApiError, FileTokenStore, MemoryTokenStore, Navigator, TokenStore, LOGIN_ROUTE};
pub use self::realtime::{BoardChannel, BoardRouter, ChannelSettings, RealtimeEvent, SyncMode};
