pub mod states;

use crate::channel::RealtimeChannel;
use crate::config::ChannelConfig;
use crate::traits::*;
use states::*;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error};

/// Type-state builder for [`RealtimeChannel`]
///
/// ```ignore
/// let channel = realtime::builder()
///     .url("wss://api.example.com/ws")
///     .router(EnvelopeRouter, |routing| {
///         routing.handler(EnvelopeRoute::All, LoggingHandler::new("board"))
///     })
///     .headers(BearerHeaders::new(token))
///     .build()
///     .await?;
/// ```
pub struct ChannelBuilder<U, Ro>
where
    U: UrlState,
    Ro: RouterState,
{
    _url_state: PhantomData<U>,
    url: Option<String>,
    routing: Ro,
    headers: Option<Arc<dyn HeaderProvider>>,
    reconnect_strategy: Option<Box<dyn ReconnectionStrategy>>,
    connect_timeout: Option<Duration>,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl ChannelBuilder<NoUrl, NoRouter> {
    pub fn new() -> Self {
        Self {
            _url_state: PhantomData,
            url: None,
            routing: NoRouter,
            headers: None,
            reconnect_strategy: None,
            connect_timeout: None,
            shutdown_flag: None,
        }
    }
}

impl Default for ChannelBuilder<NoUrl, NoRouter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ro> ChannelBuilder<NoUrl, Ro>
where
    Ro: RouterState,
{
    pub fn url(self, url: impl Into<String>) -> ChannelBuilder<HasUrl, Ro> {
        ChannelBuilder {
            _url_state: PhantomData,
            url: Some(url.into()),
            routing: self.routing,
            headers: self.headers,
            reconnect_strategy: self.reconnect_strategy,
            connect_timeout: self.connect_timeout,
            shutdown_flag: self.shutdown_flag,
        }
    }
}

/// Collects one handler per route key
pub struct RoutingBuilder<R>
where
    R: MessageRouter,
{
    handlers: HashMap<R::RouteKey, Box<dyn MessageHandler<R::Message>>>,
}

impl<R> RoutingBuilder<R>
where
    R: MessageRouter,
{
    fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register the handler for `route_key`; a later registration replaces
    /// an earlier one
    pub fn handler<H>(mut self, route_key: R::RouteKey, handler: H) -> Self
    where
        H: MessageHandler<R::Message>,
    {
        self.handlers.insert(route_key, Box::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Spawn one OS thread per handler
    ///
    /// A thread drains its channel and exits once every sender is dropped.
    fn spawn(
        self,
    ) -> (
        HashMap<R::RouteKey, crossbeam_channel::Sender<R::Message>>,
        Vec<JoinHandle<()>>,
    ) {
        let mut senders = HashMap::new();
        let mut handles = Vec::new();

        for (route_key, mut handler) in self.handlers {
            let (sender, receiver) = crossbeam_channel::unbounded::<R::Message>();
            senders.insert(route_key.clone(), sender);

            let handle = std::thread::spawn(move || {
                for message in receiver.iter() {
                    if let Err(e) = handler.handle(message) {
                        error!("Handler error for route {:?}: {}", route_key, e);
                    }
                }
                debug!("Handler channel closed for route {:?}, thread exiting", route_key);
            });

            handles.push(handle);
        }

        (senders, handles)
    }
}

impl<U> ChannelBuilder<U, NoRouter>
where
    U: UrlState,
{
    pub fn router<R, F>(self, router: R, configure_routing: F) -> ChannelBuilder<U, Routed<R>>
    where
        R: MessageRouter,
        F: FnOnce(RoutingBuilder<R>) -> RoutingBuilder<R>,
    {
        let routing = configure_routing(RoutingBuilder::new());

        ChannelBuilder {
            _url_state: PhantomData,
            url: self.url,
            routing: Routed { router, routing },
            headers: self.headers,
            reconnect_strategy: self.reconnect_strategy,
            connect_timeout: self.connect_timeout,
            shutdown_flag: self.shutdown_flag,
        }
    }
}

impl<U, Ro> ChannelBuilder<U, Ro>
where
    U: UrlState,
    Ro: RouterState,
{
    pub fn headers(mut self, provider: impl HeaderProvider + 'static) -> Self {
        self.headers = Some(Arc::new(provider));
        self
    }

    /// Opt in to reconnection; the default is [`NeverReconnect`]
    pub fn reconnect_strategy(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.reconnect_strategy = Some(Box::new(strategy));
        self
    }

    pub fn reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect_strategy = Some(policy.into_strategy());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Share a running flag with other components
    ///
    /// Storing `false` closes the channel and suppresses reconnection.
    pub fn shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }
}

impl<R> ChannelBuilder<HasUrl, Routed<R>>
where
    R: MessageRouter,
{
    /// Spawn the channel's I/O task and start connecting
    ///
    /// Returns as soon as the task is running; watch
    /// [`RealtimeChannel::connection_state`] or the event stream for `Open`.
    pub async fn build(self) -> Result<RealtimeChannel<R>> {
        let url = self
            .url
            .ok_or_else(|| RealtimeError::Configuration("URL must be set".into()))?;
        validate_url(&url)?;

        let Routed { router, routing } = self.routing;
        let (route_senders, handler_handles) = routing.spawn();

        let config = ChannelConfig {
            url,
            router: Arc::new(router),
            route_senders,
            headers: self.headers,
            reconnect_strategy: self
                .reconnect_strategy
                .unwrap_or_else(|| Box::new(NeverReconnect)),
            connect_timeout: self.connect_timeout,
            shutdown_flag: self
                .shutdown_flag
                .unwrap_or_else(|| Arc::new(AtomicBool::new(true))),
        };

        Ok(RealtimeChannel::spawn(config, handler_handles))
    }
}

fn validate_url(url: &str) -> Result<()> {
    if url.starts_with("ws://") || url.starts_with("wss://") {
        Ok(())
    } else {
        Err(RealtimeError::Configuration(format!(
            "realtime URL must start with ws:// or wss://, got '{}'",
            url
        )))
    }
}
