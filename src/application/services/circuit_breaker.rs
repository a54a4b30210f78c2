//! # Circuit Breaker
//!
//! Per-carrier failure tracking that stops calls to a carrier that keeps
//! failing.
//!
//! Two states per carrier:
//!
//! - **Closed**: calls are permitted and consecutive failures are counted
//! - **Open**: calls are rejected without touching the network
//!
//! The breaker opens when the consecutive-failure count reaches the
//! threshold. There is no half-open probe: once `reset_timeout` has elapsed
//! since the last failure, the next [`CircuitBreaker::is_open`] check closes
//! the breaker and zeroes the counter, and that call proceeds as normal.
//!
//! State is held in a [`DashMap`], so mutations are serialized per carrier
//! without a global lock. Time comes from `tokio::time::Instant` and follows
//! the paused test clock.

use crate::domain::value_objects::{Carrier, Timestamp};
use dashmap::DashMap;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Default consecutive failures before the breaker opens.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Default time an open breaker stays open after the last failure.
pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(60);

/// Circuit breaker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the breaker.
    pub failure_threshold: u32,
    /// Time after the last failure before an open breaker closes.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BreakerState {
    failures: u32,
    last_failure: Option<Instant>,
    last_failure_at: Option<Timestamp>,
    open: bool,
}

impl BreakerState {
    fn reset_window_elapsed(&self, reset_timeout: Duration) -> bool {
        self.last_failure
            .is_none_or(|last| last.elapsed() >= reset_timeout)
    }
}

/// Point-in-time view of one carrier's breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakerSnapshot {
    /// Consecutive failures recorded.
    pub failures: u32,
    /// Wall-clock time of the last failure.
    pub last_failure_at: Option<Timestamp>,
    /// Whether calls are currently rejected.
    pub is_open: bool,
}

/// Per-carrier circuit breaker.
///
/// # Examples
///
/// ```
/// use shipquote::application::services::circuit_breaker::CircuitBreaker;
/// use shipquote::domain::value_objects::Carrier;
///
/// let breaker = CircuitBreaker::default();
/// for _ in 0..5 {
///     breaker.record_failure(Carrier::Frenet);
/// }
/// assert!(breaker.is_open(Carrier::Frenet));
///
/// breaker.record_success(Carrier::Frenet);
/// assert!(!breaker.is_open(Carrier::Frenet));
/// ```
#[derive(Debug, Default)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    states: DashMap<Carrier, BreakerState>,
}

impl CircuitBreaker {
    /// Creates a breaker with the given settings.
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            states: DashMap::new(),
        }
    }

    /// Breaker settings.
    #[inline]
    #[must_use]
    pub fn config(&self) -> CircuitBreakerConfig {
        self.config
    }

    /// Resets the failure counter and closes the breaker.
    ///
    /// Does nothing for a carrier that never failed.
    pub fn record_success(&self, carrier: Carrier) {
        if let Some(mut state) = self.states.get_mut(&carrier) {
            if state.open {
                info!(carrier = %carrier, "circuit breaker closed after success");
            }
            state.failures = 0;
            state.open = false;
        }
    }

    /// Records a failure.
    ///
    /// Returns true if the failure count has reached the threshold, i.e. the
    /// breaker is open after this call.
    pub fn record_failure(&self, carrier: Carrier) -> bool {
        let mut state = self.states.entry(carrier).or_default();
        state.failures = state.failures.saturating_add(1);
        state.last_failure = Some(Instant::now());
        state.last_failure_at = Some(Timestamp::now());

        if state.failures >= self.config.failure_threshold {
            if !state.open {
                warn!(
                    carrier = %carrier,
                    failures = state.failures,
                    threshold = self.config.failure_threshold,
                    "circuit breaker opened"
                );
            }
            state.open = true;
            return true;
        }

        debug!(
            carrier = %carrier,
            failures = state.failures,
            threshold = self.config.failure_threshold,
            "carrier failure recorded"
        );
        false
    }

    /// Returns true if calls to `carrier` must be rejected.
    ///
    /// An open breaker whose reset window has elapsed is closed here, with
    /// its counter zeroed, and reports false.
    pub fn is_open(&self, carrier: Carrier) -> bool {
        let Some(mut state) = self.states.get_mut(&carrier) else {
            return false;
        };
        if !state.open {
            return false;
        }
        if state.reset_window_elapsed(self.config.reset_timeout) {
            state.open = false;
            state.failures = 0;
            info!(carrier = %carrier, "circuit breaker reset window elapsed, closing");
            return false;
        }
        true
    }

    /// Returns a snapshot of the carrier's breaker, if it ever failed.
    ///
    /// Reading a snapshot does not close an expired breaker.
    #[must_use]
    pub fn state(&self, carrier: Carrier) -> Option<BreakerSnapshot> {
        self.states.get(&carrier).map(|state| BreakerSnapshot {
            failures: state.failures,
            last_failure_at: state.last_failure_at,
            is_open: state.open && !state.reset_window_elapsed(self.config.reset_timeout),
        })
    }
}
