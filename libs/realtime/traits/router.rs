//! Message Routing
//!
//! Incoming data frames are parsed by a [`MessageRouter`] into a typed
//! message, then handed to the [`MessageHandler`] registered for the
//! message's route key.
//!
//! ```text
//! WebSocket → Router::parse → route_key → Channel → Handler thread
//!                                  ↓
//!                          Board route    → Board handler (sequential)
//!                          Notice route   → Notice handler (sequential)
//! ```
//!
//! Frames are parsed on the I/O task in receive order, so messages that share
//! a route are handled in the order the transport delivered them. Different
//! routes run on different threads and may interleave.

use crate::{Result, WsMessage};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::info;

/// Parses raw frames and picks the handler route for each message
///
/// A parse error is logged by the channel and the frame is dropped; the
/// receive loop keeps running.
#[async_trait]
pub trait MessageRouter: Send + Sync + 'static {
    /// The parsed message type
    type Message: Send + Debug + 'static;

    /// The route key type
    type RouteKey: Hash + Eq + Clone + Send + Sync + Debug + 'static;

    /// Parse a raw frame into a typed message
    async fn parse(&self, message: WsMessage) -> Result<Self::Message>;

    /// Route key for a parsed message
    fn route_key(&self, message: &Self::Message) -> Self::RouteKey;
}

/// Processes routed messages on a dedicated thread
///
/// `handle` runs outside the async runtime and may block. An error is logged
/// and the handler keeps receiving.
pub trait MessageHandler<M>: Send + 'static
where
    M: Send + Debug + 'static,
{
    fn handle(&mut self, message: M) -> Result<()>;
}

/// Route key of an [`EnvelopeRouter`] message
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnvelopeRoute {
    All,
}

/// Router for opaque JSON envelopes
///
/// Accepts any JSON text frame as a `serde_json::Value`. Binary frames and
/// text that is not JSON are parse errors.
pub struct EnvelopeRouter;

#[async_trait]
impl MessageRouter for EnvelopeRouter {
    type Message = Value;
    type RouteKey = EnvelopeRoute;

    async fn parse(&self, message: WsMessage) -> Result<Self::Message> {
        match message {
            WsMessage::Text(text) => Ok(serde_json::from_str(&text)?),
            WsMessage::Binary(data) => Err(crate::RealtimeError::Parse(format!(
                "unexpected binary frame ({} bytes)",
                data.len()
            ))),
        }
    }

    fn route_key(&self, _message: &Self::Message) -> Self::RouteKey {
        EnvelopeRoute::All
    }
}

/// Handler that logs every message and does nothing else
pub struct LoggingHandler {
    label: String,
}

impl LoggingHandler {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl<M> MessageHandler<M> for LoggingHandler
where
    M: Send + Debug + 'static,
{
    fn handle(&mut self, message: M) -> Result<()> {
        info!("[{}] Message received: {:?}", self.label, message);
        Ok(())
    }
}
