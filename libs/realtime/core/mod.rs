//! Channel runtime: builder, connection loop, state
//!
//! ```rust,ignore
//! use realtime::{builder, EnvelopeRoute, EnvelopeRouter, LoggingHandler};
//!
//! let channel = builder()
//!     .url("ws://localhost:5000")
//!     .router(EnvelopeRouter, |routing| {
//!         routing.handler(EnvelopeRoute::All, LoggingHandler::new("realtime"))
//!     })
//!     .build()
//!     .await?;
//!
//! channel.wait_until_open(Duration::from_secs(5)).await;
//! channel.send_message(&serde_json::json!({"type": "ping"}));
//! channel.close().await?;
//! ```

pub mod builder;
pub mod channel;
pub mod config;
pub mod connection_state;

pub use builder::{states, ChannelBuilder, RoutingBuilder};
pub use channel::{ChannelEvent, Metrics, RealtimeChannel};
pub use config::ChannelConfig;
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};

/// Start building a channel
pub fn builder() -> ChannelBuilder<builder::states::NoUrl, builder::states::NoRouter> {
    ChannelBuilder::new()
}
