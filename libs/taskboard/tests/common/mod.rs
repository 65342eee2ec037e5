//! Shared helpers for taskboard integration tests

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// One request as the mock API saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(String, String), (u16, Value)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Scriptable stand-in for the board REST API
///
/// Answers from a `(method, path)` table; anything unscripted is a 404.
pub struct MockApi {
    pub addr: SocketAddr,
    state: Arc<MockState>,
    server: tokio::task::JoinHandle<()>,
}

impl MockApi {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state, server }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) -> &Self {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method.to_uppercase(), path.to_string()), (status, body));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request recorded")
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_owned),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        body: serde_json::from_slice(&body).ok(),
    });

    let scripted = state
        .routes
        .lock()
        .unwrap()
        .get(&(method.to_string(), path))
        .cloned();

    match scripted {
        Some((status, body)) => {
            let status = StatusCode::from_u16(status).unwrap();
            if body.is_null() {
                status.into_response()
            } else {
                (status, Json(body)).into_response()
            }
        }
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "Not found"}))).into_response(),
    }
}

/// WebSocket endpoint that pushes `script` to each client, then stays open
/// until the client leaves
pub async fn start_ws_script(script: Vec<String>) -> (String, Arc<Mutex<Vec<String>>>) {
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let received = Arc::new(Mutex::new(Vec::new()));

    {
        let received = Arc::clone(&received);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let script = script.clone();
                let received = Arc::clone(&received);
                tokio::spawn(async move {
                    let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                        return;
                    };
                    let (mut write, mut read) = ws.split();
                    for frame in script {
                        if write.send(Message::Text(frame)).await.is_err() {
                            return;
                        }
                    }
                    while let Some(Ok(message)) = read.next().await {
                        match message {
                            Message::Text(text) => received.lock().unwrap().push(text),
                            Message::Close(_) => break,
                            _ => {}
                        }
                    }
                });
            }
        });
    }

    (url, received)
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

pub fn board_json(id: &str, columns: &[&str]) -> Value {
    json!({"_id": id, "title": format!("Board {}", id), "columns": columns, "members": []})
}

pub fn column_json(id: &str, board: &str, tasks: &[&str]) -> Value {
    json!({"_id": id, "board": board, "title": format!("Column {}", id), "tasks": tasks})
}

pub fn task_json(id: &str, column: &str) -> Value {
    json!({
        "_id": id,
        "column": column,
        "title": format!("Task {}", id),
        "status": "todo",
        "priority": "medium",
        "assignees": []
    })
}
