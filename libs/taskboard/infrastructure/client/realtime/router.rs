//! Routes board envelopes to their handlers

use super::events::{BoardEvent, RealtimeEvent};
use async_trait::async_trait;
use realtime::{MessageRouter, RealtimeError, WsMessage};

/// Handler route of a [`RealtimeEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventRoute {
    /// Board, column, task and member changes
    Board,
    Notification,
    Other,
}

/// Parses JSON text frames into [`RealtimeEvent`]s
///
/// Text that is not JSON and binary frames are parse errors, which the
/// channel logs and drops.
pub struct BoardRouter;

#[async_trait]
impl MessageRouter for BoardRouter {
    type Message = RealtimeEvent;
    type RouteKey = EventRoute;

    async fn parse(&self, message: WsMessage) -> realtime::Result<Self::Message> {
        match message {
            WsMessage::Text(text) => {
                let value = serde_json::from_str(&text)?;
                Ok(RealtimeEvent::from_value(value))
            }
            WsMessage::Binary(data) => Err(RealtimeError::Parse(format!(
                "binary frames are not supported ({} bytes)",
                data.len()
            ))),
        }
    }

    fn route_key(&self, message: &Self::Message) -> Self::RouteKey {
        match message {
            RealtimeEvent::Board(BoardEvent::NotificationNew(_)) => EventRoute::Notification,
            RealtimeEvent::Board(_) => EventRoute::Board,
            RealtimeEvent::Other(_) => EventRoute::Other,
        }
    }
}
