//! Realtime board channel
//!
//! Builds a [`realtime::RealtimeChannel`] for the board socket: the
//! [`BoardRouter`] splits envelopes into board, notification and other
//! routes. By default every route only logs; [`SyncMode::Store`] swaps in
//! [`StoreSyncHandler`] so remote changes land in the shared store.

pub mod events;
pub mod handler;
pub mod router;

pub use events::{BoardEvent, ColumnRef, EntityRef, MemberAdded, MemberRemoved, RealtimeEvent, TaskMove};
pub use handler::StoreSyncHandler;
pub use router::{BoardRouter, EventRoute};

use super::api::TokenStore;
use crate::application::SharedStore;
use async_trait::async_trait;
use realtime::{HeaderProvider, Headers, LoggingHandler, ReconnectPolicy, RealtimeChannel};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub type BoardChannel = RealtimeChannel<BoardRouter>;

/// Where received events go
pub enum SyncMode {
    LogOnly,
    Store(SharedStore),
}

#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub url: String,
    pub reconnect: ReconnectPolicy,
    pub connect_timeout: Option<Duration>,
}

impl ChannelSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect: ReconnectPolicy::default(),
            connect_timeout: None,
        }
    }
}

/// Handshake headers built from the session token at connect time
pub struct SessionHeaders {
    tokens: Arc<dyn TokenStore>,
}

impl SessionHeaders {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl HeaderProvider for SessionHeaders {
    async fn get_headers(&self) -> Headers {
        let mut headers = Headers::new();
        if let Some(token) = self.tokens.token() {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        headers
    }
}

/// Open the board channel
///
/// Returns once the I/O task is running, not once the socket is open.
pub async fn connect(
    settings: &ChannelSettings,
    tokens: Arc<dyn TokenStore>,
    sync: SyncMode,
    shutdown_flag: Option<Arc<AtomicBool>>,
) -> realtime::Result<BoardChannel> {
    info!("Connecting board channel to {}", settings.url);

    let builder = realtime::builder()
        .url(settings.url.clone())
        .router(BoardRouter, move |routing| match sync {
            SyncMode::LogOnly => routing
                .handler(EventRoute::Board, LoggingHandler::new("board"))
                .handler(EventRoute::Notification, LoggingHandler::new("notification"))
                .handler(EventRoute::Other, LoggingHandler::new("other")),
            SyncMode::Store(store) => routing
                .handler(EventRoute::Board, StoreSyncHandler::new(Arc::clone(&store)))
                .handler(EventRoute::Notification, StoreSyncHandler::new(store))
                .handler(EventRoute::Other, LoggingHandler::new("other")),
        })
        .headers(SessionHeaders::new(tokens))
        .reconnect_policy(settings.reconnect.clone());

    let builder = match settings.connect_timeout {
        Some(timeout) => builder.connect_timeout(timeout),
        None => builder,
    };
    let builder = match shutdown_flag {
        Some(flag) => builder.shutdown_flag(flag),
        None => builder,
    };

    builder.build().await
}
