use crate::traits::*;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Everything the channel's I/O task needs, assembled by the builder
pub struct ChannelConfig<R>
where
    R: MessageRouter,
{
    /// WebSocket URL (ws:// or wss://)
    pub(crate) url: String,

    pub(crate) router: Arc<R>,

    /// Per-route handler channels
    pub(crate) route_senders: HashMap<R::RouteKey, crossbeam_channel::Sender<R::Message>>,

    /// Handshake headers, evaluated on every connection attempt
    pub(crate) headers: Option<Arc<dyn HeaderProvider>>,

    pub(crate) reconnect_strategy: Box<dyn ReconnectionStrategy>,

    /// Upper bound on a single connection attempt
    pub(crate) connect_timeout: Option<Duration>,

    /// Cleared to stop the channel from outside (e.g. a Ctrl+C handler)
    pub(crate) shutdown_flag: Arc<AtomicBool>,
}

impl<R> ChannelConfig<R>
where
    R: MessageRouter,
{
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn has_headers(&self) -> bool {
        self.headers.is_some()
    }

    pub fn handler_count(&self) -> usize {
        self.route_senders.len()
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }
}
