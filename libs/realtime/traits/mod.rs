//! Traits and shared types of the realtime channel
//!
//! - **MessageRouter** / **MessageHandler**: parse frames and process them
//! - **HeaderProvider**: handshake headers (bearer token)
//! - **ReconnectionStrategy**: what happens after the connection is lost

pub mod error;
pub mod headers;
pub mod message;
pub mod reconnect;
pub mod router;

pub use error::{RealtimeError, Result};
pub use headers::{BearerHeaders, HeaderProvider, Headers, NoHeaders};
pub use message::{Delivery, WsMessage};
pub use reconnect::{
    ExponentialBackoff, FixedDelay, NeverReconnect, ReconnectPolicy, ReconnectionStrategy,
};
pub use router::{EnvelopeRoute, EnvelopeRouter, LoggingHandler, MessageHandler, MessageRouter};
