//! Reconnection strategies
//!
//! The channel's default is [`NeverReconnect`]: a closed or failed connection
//! is terminal and the caller connects again explicitly. Callers may opt in
//! to [`FixedDelay`] or [`ExponentialBackoff`]. Frames offered while the
//! connection is down are dropped under every strategy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub trait ReconnectionStrategy: Send + Sync {
    /// Delay before reconnect attempt `attempt` (0-indexed), `None` to stop
    fn next_delay(&self, attempt: usize) -> Option<Duration>;

    fn should_reconnect(&self, attempt: usize) -> bool;
}

/// Connection loss is terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverReconnect;

impl ReconnectionStrategy for NeverReconnect {
    fn next_delay(&self, _attempt: usize) -> Option<Duration> {
        None
    }

    fn should_reconnect(&self, _attempt: usize) -> bool {
        false
    }
}

/// Same delay before every attempt
#[derive(Debug, Clone)]
pub struct FixedDelay {
    delay: Duration,
    max_attempts: Option<usize>,
}

impl FixedDelay {
    pub fn new(delay: Duration, max_attempts: Option<usize>) -> Self {
        Self { delay, max_attempts }
    }
}

impl ReconnectionStrategy for FixedDelay {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        self.should_reconnect(attempt).then_some(self.delay)
    }

    fn should_reconnect(&self, attempt: usize) -> bool {
        self.max_attempts.map_or(true, |max| attempt < max)
    }
}

/// `initial_delay * 2^attempt`, capped at `max_delay`
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    max_attempts: Option<usize>,
}

impl ExponentialBackoff {
    pub fn new(initial_delay: Duration, max_delay: Duration, max_attempts: Option<usize>) -> Self {
        Self {
            initial_delay,
            max_delay,
            max_attempts,
        }
    }
}

impl ReconnectionStrategy for ExponentialBackoff {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        if !self.should_reconnect(attempt) {
            return None;
        }

        let factor = 1u32.checked_shl(attempt.min(31) as u32).unwrap_or(u32::MAX);
        let delay = self
            .initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay);
        Some(delay.min(self.max_delay))
    }

    fn should_reconnect(&self, attempt: usize) -> bool {
        self.max_attempts.map_or(true, |max| attempt < max)
    }
}

/// Serializable reconnection policy, as written in configuration files
///
/// ```yaml
/// reconnect:
///   kind: exponential
///   initial_delay_ms: 500
///   max_delay_ms: 30000
///   max_attempts: 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconnectPolicy {
    #[default]
    Never,
    Fixed {
        delay_ms: u64,
        #[serde(default)]
        max_attempts: Option<usize>,
    },
    Exponential {
        initial_delay_ms: u64,
        max_delay_ms: u64,
        #[serde(default)]
        max_attempts: Option<usize>,
    },
}

impl ReconnectPolicy {
    pub fn into_strategy(self) -> Box<dyn ReconnectionStrategy> {
        match self {
            ReconnectPolicy::Never => Box::new(NeverReconnect),
            ReconnectPolicy::Fixed {
                delay_ms,
                max_attempts,
            } => Box::new(FixedDelay::new(
                Duration::from_millis(delay_ms),
                max_attempts,
            )),
            ReconnectPolicy::Exponential {
                initial_delay_ms,
                max_delay_ms,
                max_attempts,
            } => Box::new(ExponentialBackoff::new(
                Duration::from_millis(initial_delay_ms),
                Duration::from_millis(max_delay_ms),
                max_attempts,
            )),
        }
    }
}
