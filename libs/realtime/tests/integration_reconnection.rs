//! Reconnection strategy behavior

use realtime::traits::reconnect::{
    ExponentialBackoff, FixedDelay, NeverReconnect, ReconnectPolicy, ReconnectionStrategy,
};
use std::time::Duration;

#[test]
fn test_exponential_backoff_full_sequence() {
    let strategy = ExponentialBackoff::new(
        Duration::from_millis(100),
        Duration::from_secs(10),
        Some(5),
    );

    let delays: Vec<u128> = (0..5)
        .map(|attempt| strategy.next_delay(attempt).unwrap().as_millis())
        .collect();
    assert_eq!(delays, vec![100, 200, 400, 800, 1600]);

    assert!(strategy.next_delay(5).is_none(), "max_attempts reached");
}

#[test]
fn test_exponential_backoff_is_capped() {
    let strategy = ExponentialBackoff::new(Duration::from_millis(500), Duration::from_secs(2), None);

    let delays: Vec<u128> = (0..6)
        .map(|attempt| strategy.next_delay(attempt).unwrap().as_millis())
        .collect();
    assert_eq!(delays, vec![500, 1000, 2000, 2000, 2000, 2000]);

    // Very large attempt numbers stay at the cap instead of overflowing
    assert_eq!(strategy.next_delay(10_000), Some(Duration::from_secs(2)));
}

#[test]
fn test_fixed_delay_respects_max_attempts() {
    let strategy = FixedDelay::new(Duration::from_millis(500), Some(3));

    for attempt in 0..3 {
        assert_eq!(strategy.next_delay(attempt), Some(Duration::from_millis(500)));
    }
    assert!(strategy.next_delay(3).is_none());
}

#[test]
fn test_never_reconnect() {
    let strategy = NeverReconnect;
    for attempt in 0..10 {
        assert!(strategy.next_delay(attempt).is_none());
        assert!(!strategy.should_reconnect(attempt));
    }
}

#[test]
fn test_policy_exponential_from_json() {
    let policy: ReconnectPolicy = serde_json::from_str(
        r#"{"kind":"exponential","initial_delay_ms":250,"max_delay_ms":1000}"#,
    )
    .unwrap();
    assert_eq!(
        policy,
        ReconnectPolicy::Exponential {
            initial_delay_ms: 250,
            max_delay_ms: 1000,
            max_attempts: None
        }
    );

    let strategy = policy.into_strategy();
    assert_eq!(strategy.next_delay(0), Some(Duration::from_millis(250)));
    assert_eq!(strategy.next_delay(3), Some(Duration::from_millis(1000)));
}

#[test]
fn test_policy_never_from_json() {
    let policy: ReconnectPolicy = serde_json::from_str(r#"{"kind":"never"}"#).unwrap();
    assert_eq!(policy, ReconnectPolicy::Never);
    assert!(!policy.into_strategy().should_reconnect(0));
}
