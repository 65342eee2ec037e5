//! Where the bearer token lives and how a forced logout leaves the page

use parking_lot::{Mutex, RwLock};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Route a forced logout navigates to
pub const LOGIN_ROUTE: &str = "/login";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistent home of the session token (the browser's local storage)
pub trait TokenStore: Send + Sync {
    fn token(&self) -> Option<String>;

    fn set_token(&self, token: &str) -> Result<(), SessionError>;

    fn clear(&self) -> Result<(), SessionError>;
}

/// Token held in process memory only
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn set_token(&self, token: &str) -> Result<(), SessionError> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.write() = None;
        Ok(())
    }
}

/// Token kept in a plain file, read on every request
///
/// A missing or blank file means "logged out".
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read token file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set_token(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Client-side routing seam
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator for headless callers; only logs the route change
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: &str) {
        info!("Navigating to {}", route);
    }
}

/// Navigator that remembers every route it was sent to
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_route(&self) -> Option<String> {
        self.history.lock().last().cloned()
    }

    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    /// True once a forced logout has happened
    pub fn was_sent_to_login(&self) -> bool {
        self.history.lock().iter().any(|route| route == LOGIN_ROUTE)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.history.lock().push(route.to_string());
    }
}
