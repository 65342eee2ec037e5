use crate::config::ChannelConfig;
use crate::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
use crate::traits::*;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWrite = SplitSink<WsStream, Message>;

/// How often the I/O task re-checks the shared shutdown flag
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
enum ChannelCommand {
    Send(WsMessage),
    Close,
}

/// Lifecycle notifications from the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Connected,
    Disconnected,
    /// Waiting before reconnect attempt N (opt-in strategies only)
    Reconnecting(usize),
    Error(String),
    /// Terminal; no further events follow
    Closed,
}

/// Counter snapshot
#[derive(Debug, Clone)]
pub struct Metrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub messages_dropped: u64,
    pub parse_failures: u64,
    pub reconnect_count: u64,
    pub connection_state: ConnectionState,
}

/// Why a single connection ended
enum ConnectionEnd {
    /// `close()`, drop, or the shutdown flag
    Requested,
    /// Peer closed or the stream ended
    Remote,
}

/// A single persistent WebSocket connection carrying JSON envelopes
///
/// - Incoming data frames are parsed by the router and dispatched to the
///   handler registered for their route. Unparseable frames are logged and
///   dropped.
/// - [`send_message`](Self::send_message) transmits only while the
///   connection is `Open`; otherwise the frame is dropped with a logged
///   error. Nothing is queued for later.
/// - Loss of the connection is terminal unless a reconnection strategy was
///   configured.
pub struct RealtimeChannel<R>
where
    R: MessageRouter,
{
    /// Holds the route senders; dropping it lets handler threads finish
    config: Option<Arc<ChannelConfig<R>>>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    command_tx: mpsc::UnboundedSender<ChannelCommand>,
    event_rx: Receiver<ChannelEvent>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
    handler_handles: Vec<JoinHandle<()>>,
    shutdown_flag: Arc<AtomicBool>,
}

impl<R> RealtimeChannel<R>
where
    R: MessageRouter,
{
    pub(crate) fn spawn(config: ChannelConfig<R>, handler_handles: Vec<JoinHandle<()>>) -> Self {
        let config = Arc::new(config);
        let state = Arc::new(AtomicConnectionState::new(ConnectionState::Idle));
        let metrics = Arc::new(AtomicMetrics::new());
        let shutdown_flag = Arc::clone(&config.shutdown_flag);

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = unbounded();

        let task_handle = {
            let config = Arc::clone(&config);
            let state = Arc::clone(&state);
            let metrics = Arc::clone(&metrics);

            tokio::spawn(async move {
                run_channel(config, state, metrics, command_rx, event_tx).await;
            })
        };

        Self {
            config: Some(config),
            state,
            metrics,
            command_tx,
            event_rx,
            task_handle: Some(task_handle),
            handler_handles,
            shutdown_flag,
        }
    }

    /// Serialize `payload` as JSON and send it
    ///
    /// Never fails: when the channel is not open, or the payload cannot be
    /// serialized, an error is logged and `Delivery::Dropped` is returned.
    pub fn send_message<T: Serialize + ?Sized>(&self, payload: &T) -> Delivery {
        match WsMessage::json(payload) {
            Ok(message) => self.send(message),
            Err(e) => {
                error!("Cannot send realtime message: {}", e);
                self.metrics.increment_dropped();
                Delivery::Dropped
            }
        }
    }

    /// Send a raw frame; same drop semantics as `send_message`
    pub fn send(&self, message: WsMessage) -> Delivery {
        let state = self.state.get();
        if state != ConnectionState::Open {
            error!("Cannot send realtime message: channel is {}", state);
            self.metrics.increment_dropped();
            return Delivery::Dropped;
        }

        match self.command_tx.send(ChannelCommand::Send(message)) {
            Ok(()) => Delivery::Sent,
            Err(_) => {
                error!("Cannot send realtime message: channel task has stopped");
                self.metrics.increment_dropped();
                Delivery::Dropped
            }
        }
    }

    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn url(&self) -> Option<&str> {
        self.config.as_deref().map(ChannelConfig::url)
    }

    pub fn metrics(&self) -> Metrics {
        Metrics {
            messages_sent: self.metrics.messages_sent(),
            messages_received: self.metrics.messages_received(),
            messages_dropped: self.metrics.messages_dropped(),
            parse_failures: self.metrics.parse_failures(),
            reconnect_count: self.metrics.reconnect_count(),
            connection_state: self.state.get(),
        }
    }

    /// Next lifecycle event, if one is pending
    pub fn try_recv_event(&self) -> Option<ChannelEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Wait for the next lifecycle event without blocking the runtime
    pub async fn next_event(&self, timeout: Duration) -> Option<ChannelEvent> {
        let rx = self.event_rx.clone();
        tokio::task::spawn_blocking(move || match rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        })
        .await
        .ok()
        .flatten()
    }

    /// Poll until the channel is open; `false` on timeout or terminal close
    pub async fn wait_until_open(&self, timeout: Duration) -> bool {
        let poll = Duration::from_millis(10);
        let mut waited = Duration::ZERO;

        while waited < timeout {
            match self.state.get() {
                ConnectionState::Open => return true,
                ConnectionState::Closed => return false,
                _ => {}
            }
            tokio::time::sleep(poll).await;
            waited += poll;
        }

        self.state.is_open()
    }

    pub fn shutdown_flag(&self) -> &Arc<AtomicBool> {
        &self.shutdown_flag
    }

    /// Close the connection and wait for handlers to drain
    pub async fn close(mut self) -> Result<()> {
        info!("Closing realtime channel");

        self.shutdown_flag.store(false, Ordering::Release);
        let _ = self.command_tx.send(ChannelCommand::Close);

        if let Some(handle) = self.task_handle.take() {
            let _ = handle.await;
        }

        // Route senders live in the config; dropping it ends the handler loops
        drop(self.config.take());

        let handles = std::mem::take(&mut self.handler_handles);
        debug!("Waiting for {} handler threads to complete", handles.len());
        let _ = tokio::task::spawn_blocking(move || {
            for handle in handles {
                let _ = handle.join();
            }
        })
        .await;

        info!("Realtime channel closed");
        Ok(())
    }
}

impl<R> Drop for RealtimeChannel<R>
where
    R: MessageRouter,
{
    fn drop(&mut self) {
        if self.task_handle.is_some() {
            self.shutdown_flag.store(false, Ordering::Release);
            let _ = self.command_tx.send(ChannelCommand::Close);
        }
    }
}

fn is_running(flag: &AtomicBool) -> bool {
    flag.load(Ordering::Acquire)
}

async fn run_channel<R>(
    config: Arc<ChannelConfig<R>>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    mut command_rx: mpsc::UnboundedReceiver<ChannelCommand>,
    event_tx: Sender<ChannelEvent>,
) where
    R: MessageRouter,
{
    let mut reconnect_attempt = 0;
    let shutdown_flag = &config.shutdown_flag;

    loop {
        if !is_running(shutdown_flag) {
            debug!("Shutdown flag cleared, leaving channel loop");
            break;
        }

        state.set(ConnectionState::Connecting);

        let mut close_requested = false;

        match open_connection(&config).await {
            Ok(ws_stream) => {
                info!("Realtime channel connected to {}", config.url);
                state.set(ConnectionState::Open);
                let _ = event_tx.send(ChannelEvent::Connected);
                reconnect_attempt = 0;

                match handle_connection(ws_stream, &config, &state, &metrics, &mut command_rx).await {
                    Ok(ConnectionEnd::Requested) => close_requested = true,
                    Ok(ConnectionEnd::Remote) => {
                        info!("Realtime channel closed by server");
                    }
                    Err(e) => {
                        error!("Realtime channel error: {}", e);
                        let _ = event_tx.send(ChannelEvent::Error(e.to_string()));
                    }
                }

                if !close_requested {
                    state.set(ConnectionState::Closing);
                }
                let _ = event_tx.send(ChannelEvent::Disconnected);
            }
            Err(e) => {
                error!("Failed to connect realtime channel: {}", e);
                let _ = event_tx.send(ChannelEvent::Error(e.to_string()));
            }
        }

        // Anything still queued was offered to a connection that no longer
        // exists; it is never replayed on a later connection.
        close_requested |= drain_commands(&mut command_rx, &metrics);

        if close_requested || !is_running(shutdown_flag) {
            break;
        }

        match config.reconnect_strategy.next_delay(reconnect_attempt) {
            Some(delay) => {
                reconnect_attempt += 1;
                state.set(ConnectionState::Reconnecting);
                let _ = event_tx.send(ChannelEvent::Reconnecting(reconnect_attempt));
                info!(
                    "Reconnecting realtime channel in {:?} (attempt {})",
                    delay, reconnect_attempt
                );

                if !wait_before_reconnect(delay, shutdown_flag, &mut command_rx, &metrics).await {
                    break;
                }
                metrics.increment_reconnects();
            }
            None => {
                info!("Realtime channel will not reconnect");
                break;
            }
        }
    }

    state.set(ConnectionState::Closed);
    let _ = event_tx.send(ChannelEvent::Closed);
    debug!("Realtime channel task exiting");
}

/// Sleep out a reconnect delay; `false` if a close arrived meanwhile
async fn wait_before_reconnect(
    delay: Duration,
    shutdown_flag: &AtomicBool,
    command_rx: &mut mpsc::UnboundedReceiver<ChannelCommand>,
    metrics: &AtomicMetrics,
) -> bool {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    let mut ticker = tokio::time::interval(SHUTDOWN_POLL_INTERVAL);

    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            _ = ticker.tick() => {
                if !is_running(shutdown_flag) {
                    return false;
                }
            }
            cmd = command_rx.recv() => match cmd {
                Some(ChannelCommand::Send(_)) => {
                    warn!("Dropping realtime message: channel is reconnecting");
                    metrics.increment_dropped();
                }
                Some(ChannelCommand::Close) | None => return false,
            }
        }
    }
}

/// Drop pending sends; `true` if a close was among them
fn drain_commands(
    command_rx: &mut mpsc::UnboundedReceiver<ChannelCommand>,
    metrics: &AtomicMetrics,
) -> bool {
    let mut close_requested = false;
    while let Ok(cmd) = command_rx.try_recv() {
        match cmd {
            ChannelCommand::Send(_) => {
                warn!("Dropping realtime message queued on a closed connection");
                metrics.increment_dropped();
            }
            ChannelCommand::Close => close_requested = true,
        }
    }
    close_requested
}

async fn open_connection<R>(config: &ChannelConfig<R>) -> Result<WsStream>
where
    R: MessageRouter,
{
    let mut request = config
        .url
        .as_str()
        .into_client_request()
        .map_err(|e| RealtimeError::Configuration(e.to_string()))?;

    if let Some(ref header_provider) = config.headers {
        for (key, value) in header_provider.get_headers().await {
            match (
                key.parse::<http::header::HeaderName>(),
                value.parse::<http::header::HeaderValue>(),
            ) {
                (Ok(name), Ok(value)) => {
                    request.headers_mut().insert(name, value);
                }
                _ => warn!("Skipping invalid handshake header '{}'", key),
            }
        }
    }

    let connect = connect_async(request);
    let result = match config.connect_timeout {
        Some(timeout) => tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| RealtimeError::WebSocket(format!("connect timed out after {:?}", timeout)))?,
        None => connect.await,
    };

    result
        .map(|(stream, _response)| stream)
        .map_err(|e| RealtimeError::WebSocket(e.to_string()))
}

async fn handle_connection<R>(
    ws_stream: WsStream,
    config: &ChannelConfig<R>,
    state: &AtomicConnectionState,
    metrics: &AtomicMetrics,
    command_rx: &mut mpsc::UnboundedReceiver<ChannelCommand>,
) -> Result<ConnectionEnd>
where
    R: MessageRouter,
{
    let (mut write, mut read) = ws_stream.split();
    let mut ticker = tokio::time::interval(SHUTDOWN_POLL_INTERVAL);

    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Close(frame))) => {
                    debug!("Close frame received: {:?}", frame);
                    return Ok(ConnectionEnd::Remote);
                }
                Some(Ok(frame)) => {
                    if let Some(message) = tungstenite_to_ws_message(frame) {
                        metrics.increment_received();
                        dispatch(config, metrics, message).await;
                    }
                }
                Some(Err(e)) => return Err(RealtimeError::WebSocket(e.to_string())),
                None => {
                    warn!("Realtime stream ended");
                    return Ok(ConnectionEnd::Remote);
                }
            },

            cmd = command_rx.recv() => match cmd {
                Some(ChannelCommand::Send(message)) => {
                    write
                        .send(ws_message_to_tungstenite(message))
                        .await
                        .map_err(|e| RealtimeError::WebSocket(e.to_string()))?;
                    metrics.increment_sent();
                }
                Some(ChannelCommand::Close) | None => {
                    close_writer(&mut write, state).await;
                    return Ok(ConnectionEnd::Requested);
                }
            },

            _ = ticker.tick() => {
                if !is_running(&config.shutdown_flag) {
                    close_writer(&mut write, state).await;
                    return Ok(ConnectionEnd::Requested);
                }
            }
        }
    }
}

async fn close_writer(write: &mut WsWrite, state: &AtomicConnectionState) {
    state.set(ConnectionState::Closing);
    if let Err(e) = write.send(Message::Close(None)).await {
        debug!("Close frame not delivered: {}", e);
    }
    let _ = write.close().await;
}

/// Parse one frame and hand it to its route; failures are logged only
async fn dispatch<R>(config: &ChannelConfig<R>, metrics: &AtomicMetrics, message: WsMessage)
where
    R: MessageRouter,
{
    match config.router.parse(message).await {
        Ok(parsed) => {
            let route_key = config.router.route_key(&parsed);
            match config.route_senders.get(&route_key) {
                Some(sender) => {
                    if sender.send(parsed).is_err() {
                        debug!("Handler for route {:?} has stopped", route_key);
                    }
                }
                None => warn!("No handler configured for route {:?}", route_key),
            }
        }
        Err(e) => {
            metrics.increment_parse_failures();
            error!("Discarding realtime message: {}", e);
        }
    }
}

fn ws_message_to_tungstenite(msg: WsMessage) -> Message {
    match msg {
        WsMessage::Text(text) => Message::Text(text),
        WsMessage::Binary(data) => Message::Binary(data),
    }
}

fn tungstenite_to_ws_message(msg: Message) -> Option<WsMessage> {
    match msg {
        Message::Text(text) => Some(WsMessage::Text(text)),
        Message::Binary(data) => Some(WsMessage::Binary(data)),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
    }
}
