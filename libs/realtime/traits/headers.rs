use async_trait::async_trait;
use std::collections::HashMap;

/// HTTP headers to send with the WebSocket handshake
pub type Headers = HashMap<String, String>;

/// Supplies handshake headers
///
/// Called on every connection attempt so tokens read at connect time are
/// always current.
#[async_trait]
pub trait HeaderProvider: Send + Sync {
    async fn get_headers(&self) -> Headers;
}

/// No extra headers
pub struct NoHeaders;

#[async_trait]
impl HeaderProvider for NoHeaders {
    async fn get_headers(&self) -> Headers {
        HashMap::new()
    }
}

/// Static `Authorization: Bearer <token>` header
pub struct BearerHeaders {
    token: String,
}

impl BearerHeaders {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl HeaderProvider for BearerHeaders {
    async fn get_headers(&self) -> Headers {
        let mut headers = HashMap::new();
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.token),
        );
        headers
    }
}
