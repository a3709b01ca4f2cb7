//! Configuration constants and environment loading for the feed service
//!
//! This module manages all runtime configuration:
//! - Fetch schedule and cycle timeout
//! - Request pacing between matches
//! - Cricbuzz endpoints, retry and circuit breaker settings
//! - Redis connection

use cricket_rust_core::circuit_breaker::CircuitBreakerConfig;
use cricket_rust_core::clients::cricbuzz::{CricbuzzConfig, MOBILE_BASE, WEB_BASE};
use cricket_rust_core::retry::{Backoff, RetryConfig};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Cycle trigger interval ("every 2 minutes")
pub const DEFAULT_FETCH_INTERVAL_SECS: u64 = 120;

/// Upper bound for a single cycle
pub const DEFAULT_CYCLE_TIMEOUT_SECS: u64 = 540;

pub const DEFAULT_COMMENTARY_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_COMMENTARY_BACKOFF_BASE_MS: u64 = 2_000;
pub const DEFAULT_COMMENTARY_BACKOFF_MAX_MS: u64 = 10_000;

/// Pause between scorecard page requests
pub const DEFAULT_SCORECARD_DELAY_MS: u64 = 1_000;

/// Pause after commentary for match `i` is `min(base + i * step, max) + jitter`
pub const DEFAULT_MATCH_DELAY_BASE_MS: u64 = 5_000;
pub const DEFAULT_MATCH_DELAY_STEP_MS: u64 = 1_000;
pub const DEFAULT_MATCH_DELAY_MAX_MS: u64 = 15_000;
pub const DEFAULT_MATCH_DELAY_JITTER_MS: u64 = 2_000;

/// Delays that keep the cycle from overloading the upstream site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingConfig {
    pub scorecard_delay: Duration,
    pub match_delay_base: Duration,
    pub match_delay_step: Duration,
    pub match_delay_max: Duration,
    pub match_delay_jitter: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            scorecard_delay: Duration::from_millis(DEFAULT_SCORECARD_DELAY_MS),
            match_delay_base: Duration::from_millis(DEFAULT_MATCH_DELAY_BASE_MS),
            match_delay_step: Duration::from_millis(DEFAULT_MATCH_DELAY_STEP_MS),
            match_delay_max: Duration::from_millis(DEFAULT_MATCH_DELAY_MAX_MS),
            match_delay_jitter: Duration::from_millis(DEFAULT_MATCH_DELAY_JITTER_MS),
        }
    }
}

impl PacingConfig {
    /// No pauses at all
    pub fn none() -> Self {
        Self {
            scorecard_delay: Duration::ZERO,
            match_delay_base: Duration::ZERO,
            match_delay_step: Duration::ZERO,
            match_delay_max: Duration::ZERO,
            match_delay_jitter: Duration::ZERO,
        }
    }

    /// Progressive pause after the match at `index`, before jitter
    pub fn match_delay(&self, index: usize) -> Duration {
        let step = self
            .match_delay_step
            .checked_mul(index as u32)
            .unwrap_or(self.match_delay_max);
        (self.match_delay_base + step).min(self.match_delay_max)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub fetch_interval: Duration,
    pub cycle_timeout: Duration,
    /// Run one cycle and exit
    pub run_once: bool,
    pub pacing: PacingConfig,
    pub cricbuzz: CricbuzzConfig,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        let pacing = PacingConfig {
            scorecard_delay: env_millis("SCORECARD_DELAY_MS", DEFAULT_SCORECARD_DELAY_MS),
            match_delay_base: env_millis("MATCH_DELAY_BASE_MS", DEFAULT_MATCH_DELAY_BASE_MS),
            match_delay_step: env_millis("MATCH_DELAY_STEP_MS", DEFAULT_MATCH_DELAY_STEP_MS),
            match_delay_max: env_millis("MATCH_DELAY_MAX_MS", DEFAULT_MATCH_DELAY_MAX_MS),
            match_delay_jitter: env_millis("MATCH_DELAY_JITTER_MS", DEFAULT_MATCH_DELAY_JITTER_MS),
        };

        let cricbuzz = CricbuzzConfig {
            web_base: env::var("CRICBUZZ_WEB_BASE").unwrap_or_else(|_| WEB_BASE.to_string()),
            mobile_base: env::var("CRICBUZZ_MOBILE_BASE")
                .unwrap_or_else(|_| MOBILE_BASE.to_string()),
            commentary_retry: RetryConfig {
                max_attempts: env_or("COMMENTARY_MAX_ATTEMPTS", DEFAULT_COMMENTARY_MAX_ATTEMPTS)
                    .max(1),
                backoff: Backoff::new(
                    DEFAULT_COMMENTARY_BACKOFF_BASE_MS,
                    DEFAULT_COMMENTARY_BACKOFF_MAX_MS,
                ),
                jitter: Duration::ZERO,
            },
            circuit_breaker: CircuitBreakerConfig::default(),
            ..Default::default()
        };

        Self {
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            fetch_interval: Duration::from_secs(
                env_or("FETCH_INTERVAL_SECS", DEFAULT_FETCH_INTERVAL_SECS).max(1),
            ),
            cycle_timeout: Duration::from_secs(env_or(
                "CYCLE_TIMEOUT_SECS",
                DEFAULT_CYCLE_TIMEOUT_SECS,
            )),
            run_once: env::var("RUN_ONCE")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
            pacing,
            cricbuzz,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn env_millis(key: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_or(key, default_ms))
}
