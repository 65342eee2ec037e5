//! REST client for the board API
//!
//! Split into focused modules:
//! - `boards`: board CRUD and analytics
//! - `columns`: column CRUD
//! - `tasks`: task CRUD and moves
//! - `members`: board membership
//! - `notifications`: the current user's notifications
//! - `session`: token storage and the logout navigation seam

mod boards;
mod columns;
mod helpers;
mod members;
mod notifications;
mod tasks;
pub mod session;
pub mod types;

pub use session::{
    FileTokenStore, LoggingNavigator, MemoryTokenStore, Navigator, RecordingNavigator, SessionError,
    TokenStore, LOGIN_ROUTE,
};
pub use types::*;

use helpers::{extract_api_error, parse_json};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The session was rejected; the token is already cleared
    #[error("Unauthorized: session expired")]
    Unauthorized,

    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Deserialization failed: {0}")]
    DeserializeFailed(String),

    #[error("Invalid client configuration: {0}")]
    Configuration(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(StatusCode::UNAUTHORIZED.as_u16()),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Generic message suitable for a toast or inline error
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "Your session has expired. Please log in again.",
            ApiError::Status { status: 404, .. } => "The requested item could not be found.",
            ApiError::Status { status: 403, .. } => "You do not have access to this board.",
            _ => "Something went wrong. Please try again.",
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// HTTP client bound to one API base URL and one session
///
/// Every request carries `Authorization: Bearer <token>` when the token store
/// holds a token. A 401 from any endpoint clears the token and navigates to
/// [`LOGIN_ROUTE`] before the call returns [`ApiError::Unauthorized`].
pub struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) client: Client,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT, tokens, navigator)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::Configuration(format!(
                "API URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()?;

        Ok(Self {
            base_url,
            client,
            tokens,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.token().is_some()
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(self.client.get(self.url(path))).await?;
        parse_json(response).await
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.client.request(method, self.url(path)).json(body))
            .await?;
        parse_json(response).await
    }

    /// Send a request whose response body is ignored
    pub(crate) async fn send_empty(&self, method: Method, path: &str) -> Result<()> {
        self.execute(self.client.request(method, self.url(path))).await?;
        Ok(())
    }

    async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let request = match self.tokens.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let request = request.build()?;
        debug!("{} {}", request.method(), request.url());

        let response = self.client.execute(request).await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.force_logout();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let err = extract_api_error(response).await;
            warn!("Request failed: {}", err);
            return Err(err);
        }

        Ok(response)
    }

    fn force_logout(&self) {
        warn!("Session rejected by API, clearing token");
        if let Err(e) = self.tokens.clear() {
            error!("Failed to clear session token: {}", e);
        }
        self.navigator.navigate(LOGIN_ROUTE);
    }
}
