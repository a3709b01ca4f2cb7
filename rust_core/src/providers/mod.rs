//! Match data provider abstraction
//!
//! Defines the CricketFeed trait that the feed cycle runs against, so the
//! cycle can be driven by Cricbuzz in production and by stubs in tests.

use crate::models::{MatchSummary, Scorecard};
use anyhow::Result;
use async_trait::async_trait;

pub mod cricbuzz;

pub use cricbuzz::CricbuzzFeed;

/// Innings tried when discovering the current innings, newest first.
pub const INNINGS_PROBE_ORDER: [u8; 4] = [4, 3, 2, 1];

/// Innings used when no probe finds commentary.
pub const DEFAULT_INNINGS: &str = "1";

#[async_trait]
pub trait CricketFeed: Send + Sync {
    /// Matches listed on the live-scores page
    async fn live_matches(&self) -> Result<Vec<MatchSummary>>;

    /// Scorecard for a listed match
    async fn scorecard(&self, summary: &MatchSummary) -> Result<Scorecard>;

    /// Innings id whose commentary should be summarized
    async fn current_innings(&self, match_id: &str) -> String;

    /// Raw commentary payload, `None` once retries are exhausted
    async fn commentary(&self, match_id: &str, innings_id: &str) -> Option<serde_json::Value>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}
