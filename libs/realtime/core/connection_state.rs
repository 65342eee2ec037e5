//! Lock-free connection state and counters
//!
//! The I/O task writes the state; `send_message` and observers read it
//! from any thread.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Lifecycle of the single channel connection
///
/// ```text
/// Idle → Connecting → Open → Closing → Closed
///            ↑          │
///            └─ Reconnecting (only with an opt-in strategy)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectionState {
    /// Created, no connection attempt yet
    Idle = 0,
    Connecting = 1,
    Open = 2,
    /// Waiting out a reconnection delay
    Reconnecting = 3,
    /// Close requested, writer shutting down
    Closing = 4,
    /// Terminal: the caller must connect again
    Closed = 5,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Idle,
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Open,
            3 => ConnectionState::Reconnecting,
            4 => ConnectionState::Closing,
            _ => ConnectionState::Closed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct AtomicConnectionState {
    inner: AtomicU8,
}

impl AtomicConnectionState {
    pub fn new(state: ConnectionState) -> Self {
        Self {
            inner: AtomicU8::new(state as u8),
        }
    }

    #[inline]
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.inner.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, state: ConnectionState) {
        self.inner.store(state as u8, Ordering::Release);
    }

    /// Transition only if the current state is `current`
    pub fn compare_exchange(
        &self,
        current: ConnectionState,
        new: ConnectionState,
    ) -> Result<ConnectionState, ConnectionState> {
        self.inner
            .compare_exchange(current as u8, new as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(ConnectionState::from_u8)
            .map_err(ConnectionState::from_u8)
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.get() == ConnectionState::Open
    }

    #[inline]
    pub fn is_connecting(&self) -> bool {
        matches!(
            self.get(),
            ConnectionState::Connecting | ConnectionState::Reconnecting
        )
    }

    /// Closing or closed
    #[inline]
    pub fn is_closing(&self) -> bool {
        matches!(self.get(), ConnectionState::Closing | ConnectionState::Closed)
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.get() == ConnectionState::Closed
    }
}

#[derive(Debug, Default)]
pub struct AtomicMetrics {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    messages_dropped: AtomicU64,
    parse_failures: AtomicU64,
    reconnect_count: AtomicU64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_parse_failures(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_reconnects(&self) {
        self.reconnect_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    pub fn messages_dropped(&self) -> u64 {
        self.messages_dropped.load(Ordering::Relaxed)
    }

    pub fn parse_failures(&self) -> u64 {
        self.parse_failures.load(Ordering::Relaxed)
    }

    pub fn reconnect_count(&self) -> u64 {
        self.reconnect_count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trips_through_atomic() {
        let state = AtomicConnectionState::new(ConnectionState::Idle);
        for s in [
            ConnectionState::Connecting,
            ConnectionState::Open,
            ConnectionState::Reconnecting,
            ConnectionState::Closing,
            ConnectionState::Closed,
        ] {
            state.set(s);
            assert_eq!(state.get(), s);
        }
    }

    #[test]
    fn test_compare_exchange_reports_actual_state() {
        let state = AtomicConnectionState::new(ConnectionState::Open);
        let err = state
            .compare_exchange(ConnectionState::Connecting, ConnectionState::Closed)
            .unwrap_err();
        assert_eq!(err, ConnectionState::Open);
        assert!(state.is_open());
    }
}
