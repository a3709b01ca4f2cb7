//! Circuit breaker for upstream site resilience.
//!
//! Stops hammering Cricbuzz once requests keep failing:
//! - Tracks consecutive failures
//! - Opens after a threshold of failures
//! - Moves to half-open once the recovery timeout has passed
//! - Closes again after enough successes while half-open

use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Requests are allowed
    Closed,
    /// Requests are blocked
    Open,
    /// Probing whether the upstream recovered
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that trip the circuit
    pub failure_threshold: u32,
    /// Time to wait before probing again
    pub recovery_timeout: Duration,
    /// Successes needed in half-open state to close the circuit
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(60),
            success_threshold: 1,
        }
    }
}

/// Shared by every request to one upstream.
///
/// ```ignore
/// let breaker = CircuitBreaker::new("cricbuzz", CircuitBreakerConfig::default());
/// if !breaker.is_available() {
///     return Err(FetchError::CircuitOpen(breaker.name().to_string()));
/// }
/// let result = fetch().await;
/// match &result {
///     Ok(_) => breaker.record_success(),
///     Err(_) => breaker.record_failure(),
/// }
/// ```
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<Tally>,
}

/// State and counters, updated together under one lock.
#[derive(Debug)]
struct Tally {
    state: CircuitState,
    consecutive_failures: u32,
    probe_successes: u32,
    opened_at: Option<Instant>,
}

impl Tally {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            probe_successes: 0,
            opened_at: None,
        }
    }

    fn open(&mut self) {
        self.state = CircuitState::Open;
        self.probe_successes = 0;
        self.opened_at = Some(Instant::now());
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tally = self.inner.lock();
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &tally.state)
            .field("failures", &tally.consecutive_failures)
            .finish()
    }
}

impl CircuitBreaker {
    pub fn new(name: &str, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            inner: Mutex::new(Tally::closed()),
        }
    }

    /// Whether a request may go out now. An open circuit whose recovery
    /// timeout has elapsed moves to half-open and lets the request through.
    pub fn is_available(&self) -> bool {
        let mut tally = self.inner.lock();
        if tally.state != CircuitState::Open {
            return true;
        }

        let cooled_down = tally
            .opened_at
            .map_or(true, |at| at.elapsed() >= self.config.recovery_timeout);
        if cooled_down {
            tally.state = CircuitState::HalfOpen;
            tally.probe_successes = 0;
            info!("Circuit breaker '{}' half-open, probing upstream", self.name);
        }
        cooled_down
    }

    pub fn record_success(&self) {
        let mut tally = self.inner.lock();
        tally.consecutive_failures = 0;

        if tally.state == CircuitState::HalfOpen {
            tally.probe_successes += 1;
            if tally.probe_successes < self.config.success_threshold {
                return;
            }
            info!(
                "Circuit breaker '{}' closed after {} successful probes",
                self.name, tally.probe_successes
            );
        }
        *tally = Tally::closed();
    }

    pub fn record_failure(&self) {
        let mut tally = self.inner.lock();
        tally.consecutive_failures += 1;

        let state = tally.state;
        match state {
            CircuitState::Closed
                if tally.consecutive_failures >= self.config.failure_threshold =>
            {
                tally.open();
                warn!(
                    "Circuit breaker '{}' OPENED after {} consecutive failures",
                    self.name, tally.consecutive_failures
                );
            }
            CircuitState::HalfOpen => {
                tally.open();
                warn!("Circuit breaker '{}' re-OPENED, probe failed", self.name);
            }
            // Open: keep the original opening time so recovery is not postponed.
            _ => {}
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn failure_count(&self) -> u32 {
        self.inner.lock().consecutive_failures
    }

    pub fn reset(&self) {
        *self.inner.lock() = Tally::closed();
    }
}
