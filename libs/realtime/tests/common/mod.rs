//! Shared helpers for realtime channel integration tests

#![allow(dead_code)]

use crossbeam_channel::{Receiver, Sender};
use realtime::{MessageHandler, WsMessage};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// What the mock server does with each accepted connection
#[derive(Clone, Default)]
pub struct ServerBehavior {
    /// Text frames pushed to the client right after the handshake
    pub script: Vec<String>,
    /// Close the connection once the script is sent (first connection only)
    pub close_first_connection: bool,
    /// Echo text frames back to the client
    pub echo: bool,
}

/// Minimal WebSocket server standing in for the board API's socket endpoint
pub struct MockWsServer {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<String>>>,
    auth_headers: Arc<Mutex<Vec<String>>>,
    connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
}

impl MockWsServer {
    pub async fn start(behavior: ServerBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let auth_headers = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let shutdown = Arc::new(Notify::new());

        {
            let received = Arc::clone(&received);
            let auth_headers = Arc::clone(&auth_headers);
            let connections = Arc::clone(&connections);
            let shutdown = Arc::clone(&shutdown);

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        accepted = listener.accept() => {
                            let Ok((stream, _)) = accepted else { break };
                            let index = connections.fetch_add(1, Ordering::SeqCst);
                            let behavior = behavior.clone();
                            let received = Arc::clone(&received);
                            let auth_headers = Arc::clone(&auth_headers);
                            let shutdown = Arc::clone(&shutdown);
                            tokio::spawn(async move {
                                handle_connection(stream, index, behavior, received, auth_headers, shutdown).await;
                            });
                        }
                        _ = shutdown.notified() => break,
                    }
                }
            });
        }

        Self {
            addr,
            received,
            auth_headers,
            connections,
            shutdown,
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Text frames the server has received so far
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    pub fn auth_headers(&self) -> Vec<String> {
        self.auth_headers.lock().unwrap().clone()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn handle_connection(
    stream: tokio::net::TcpStream,
    index: usize,
    behavior: ServerBehavior,
    received: Arc<Mutex<Vec<String>>>,
    auth_headers: Arc<Mutex<Vec<String>>>,
    shutdown: Arc<Notify>,
) {
    use futures_util::{SinkExt, StreamExt};

    let record_auth = {
        let auth_headers = Arc::clone(&auth_headers);
        move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            if let Some(value) = request.headers().get("Authorization") {
                if let Ok(value) = value.to_str() {
                    auth_headers.lock().unwrap().push(value.to_string());
                }
            }
            Ok(response)
        }
    };

    let ws_stream = match tokio_tungstenite::accept_hdr_async(stream, record_auth).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();

    for frame in &behavior.script {
        if write.send(Message::Text(frame.clone())).await.is_err() {
            return;
        }
    }

    if behavior.close_first_connection && index == 0 {
        let _ = write.send(Message::Close(None)).await;
        return;
    }

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    received.lock().unwrap().push(text.clone());
                    if behavior.echo && write.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            _ = shutdown.notified() => break,
        }
    }
}

/// Handler that forwards everything it receives to a test-side receiver
pub struct CollectingHandler<M> {
    tx: Sender<M>,
}

impl<M> CollectingHandler<M> {
    pub fn new() -> (Self, Receiver<M>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl<M> MessageHandler<M> for CollectingHandler<M>
where
    M: Send + std::fmt::Debug + 'static,
{
    fn handle(&mut self, message: M) -> realtime::Result<()> {
        let _ = self.tx.send(message);
        Ok(())
    }
}

/// Receive from a handler without blocking the test runtime
pub async fn recv_within<M: Send + 'static>(rx: &Receiver<M>, timeout: Duration) -> Option<M> {
    let rx = rx.clone();
    tokio::task::spawn_blocking(move || rx.recv_timeout(timeout).ok())
        .await
        .ok()
        .flatten()
}

/// Poll `check` until it holds or `timeout` elapses
pub async fn eventually(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let step = Duration::from_millis(10);
    let mut waited = Duration::ZERO;
    while waited < timeout {
        if check() {
            return true;
        }
        tokio::time::sleep(step).await;
        waited += step;
    }
    check()
}

pub fn text(message: &WsMessage) -> &str {
    message.as_text().unwrap_or_default()
}
