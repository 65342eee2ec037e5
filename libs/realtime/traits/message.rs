use serde::Serialize;

/// A data frame on the channel
///
/// Control frames (ping/pong/close) never surface as `WsMessage`;
/// the transport answers them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl WsMessage {
    /// Serialize a payload into a JSON text frame
    pub fn json<T: Serialize + ?Sized>(payload: &T) -> crate::Result<Self> {
        serde_json::to_string(payload)
            .map(WsMessage::Text)
            .map_err(|e| crate::RealtimeError::Serialize(e.to_string()))
    }

    /// Get the message as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WsMessage::Text(s) => Some(s),
            WsMessage::Binary(_) => None,
        }
    }

    /// Get the message as binary, if it is binary
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            WsMessage::Text(_) => None,
            WsMessage::Binary(b) => Some(b),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, WsMessage::Text(_))
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, WsMessage::Binary(_))
    }

    /// Size of the frame payload in bytes
    pub fn len(&self) -> usize {
        match self {
            WsMessage::Text(s) => s.len(),
            WsMessage::Binary(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of a send request
///
/// Sending never fails loudly: a frame offered while the channel is not
/// open is dropped and reported as `Dropped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Frame handed to the connection writer
    Sent,
    /// Channel was not open; frame discarded
    Dropped,
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}
