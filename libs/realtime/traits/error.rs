use thiserror::Error;

/// Errors raised by the realtime channel
#[derive(Error, Debug)]
pub enum RealtimeError {
    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Connection closed by the peer or the transport
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Envelope could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Envelope could not be serialized for sending
    #[error("Serialize error: {0}")]
    Serialize(String),

    /// Internal channel send error
    #[error("Channel send error: {0}")]
    ChannelSend(String),

    /// Invalid builder or handshake configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Handler failed to process a routed message
    #[error("Handler error: {0}")]
    Handler(String),
}

impl From<serde_json::Error> for RealtimeError {
    fn from(err: serde_json::Error) -> Self {
        RealtimeError::Parse(err.to_string())
    }
}

/// Result type for realtime operations
pub type Result<T> = std::result::Result<T, RealtimeError>;
