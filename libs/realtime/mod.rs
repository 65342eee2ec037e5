//! # realtime
//!
//! Single-connection WebSocket channel for live board updates.
//!
//! - One connection to one URL, JSON text envelopes
//! - Typed routing: a router parses frames, per-route handler threads
//!   process them in receive order
//! - Sends are dropped, never queued, while the connection is not open
//! - No reconnection unless a strategy is supplied

pub mod core;
pub mod traits;

pub use traits::*;

pub use crate::core::{
    builder, channel, config, connection_state,
    builder::{states, ChannelBuilder, RoutingBuilder},
    channel::{ChannelEvent, Metrics, RealtimeChannel},
    config::ChannelConfig,
    connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState},
};
