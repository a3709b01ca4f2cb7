//! Cricbuzz provider
//!
//! Implements the CricketFeed trait on top of the Cricbuzz HTTP client:
//! pages are parsed with the `scrape` extractors, commentary is returned raw.

use super::{CricketFeed, DEFAULT_INNINGS, INNINGS_PROBE_ORDER};
use crate::clients::CricbuzzClient;
use crate::commentary::CommentaryPayload;
use crate::models::{MatchSummary, Scorecard};
use crate::scrape;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, warn};

pub struct CricbuzzFeed {
    client: CricbuzzClient,
}

impl CricbuzzFeed {
    pub fn new(client: CricbuzzClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CricketFeed for CricbuzzFeed {
    async fn live_matches(&self) -> Result<Vec<MatchSummary>> {
        let html = self
            .client
            .live_scores_page()
            .await
            .context("Failed to fetch live-scores page")?;
        scrape::parse_live_matches(&html)
    }

    async fn scorecard(&self, summary: &MatchSummary) -> Result<Scorecard> {
        let html = self
            .client
            .scorecard_page(&summary.scorecard_links)
            .await
            .with_context(|| format!("Failed to fetch scorecard for {}", summary.display_name()))?;
        scrape::parse_scorecard(&html, summary.display_name())
    }

    async fn current_innings(&self, match_id: &str) -> String {
        for innings in INNINGS_PROBE_ORDER {
            let innings = innings.to_string();
            match self.client.probe_commentary(match_id, &innings).await {
                Ok(value) => {
                    let found = CommentaryPayload::from_value(&value)
                        .and_then(|p| p.innings_id().map(ToString::to_string));
                    match found {
                        Some(id) => {
                            info!("Match {}: found innings id {}", match_id, id);
                            return id;
                        }
                        None => debug!("Match {}: no commentary for innings {}", match_id, innings),
                    }
                }
                Err(e) => debug!("Match {}: innings {} probe failed: {}", match_id, innings, e),
            }
        }

        info!(
            "Match {}: no valid innings found, using default '{}'",
            match_id, DEFAULT_INNINGS
        );
        DEFAULT_INNINGS.to_string()
    }

    async fn commentary(&self, match_id: &str, innings_id: &str) -> Option<serde_json::Value> {
        match self.client.commentary(match_id, innings_id).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("No commentary retrieved for match {}: {}", match_id, e);
                None
            }
        }
    }

    fn provider_name(&self) -> &str {
        "cricbuzz"
    }
}
