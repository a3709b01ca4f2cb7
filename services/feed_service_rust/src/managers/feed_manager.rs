use crate::config::PacingConfig;
use crate::managers::run_guard::RunGuard;
use crate::state::{CycleOutcome, CycleReport};
use anyhow::{Context, Result};
use chrono::Utc;
use cricket_rust_core::commentary::extract_events_from_value;
use cricket_rust_core::models::{
    MatchCommentary, MatchSummary, Scorecard, COLLECTION, COMMENTARY_DOC, MATCHES_DOC,
    SCORECARD_DOC,
};
use cricket_rust_core::retry::jitter;
use cricket_rust_core::scrape::extract_match_id;
use cricket_rust_core::store::Document;
use cricket_rust_core::{CricketFeed, DocumentStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Runs feed cycles: live matches, then scorecards, then commentary, then one
/// batched write of the three documents.
pub struct FeedManager {
    feed: Arc<dyn CricketFeed>,
    store: Arc<dyn DocumentStore>,
    pacing: PacingConfig,
    guard: RunGuard,
}

impl FeedManager {
    pub fn new(
        feed: Arc<dyn CricketFeed>,
        store: Arc<dyn DocumentStore>,
        pacing: PacingConfig,
    ) -> Self {
        Self {
            feed,
            store,
            pacing,
            guard: RunGuard::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    /// Run one cycle unless another is in flight.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let Some(_permit) = self.guard.try_acquire() else {
            warn!("Previous feed cycle still running, skipping");
            return Ok(CycleOutcome::Skipped);
        };

        let span = info_span!(
            "feed_cycle",
            run_id = %Uuid::new_v4(),
            provider = self.feed.provider_name()
        );
        self.cycle().instrument(span).await
    }

    /// Run one cycle, giving up after `limit`. Failure and timeout are errors.
    pub async fn run_single(&self, limit: Duration) -> Result<CycleOutcome> {
        tokio::time::timeout(limit, self.run_cycle())
            .await
            .with_context(|| format!("Feed cycle exceeded {}s, abandoned", limit.as_secs()))?
    }

    /// [`run_single`](Self::run_single) for the scheduler: errors are logged, not returned.
    pub async fn run_bounded(&self, limit: Duration) -> Option<CycleOutcome> {
        match self.run_single(limit).await {
            Ok(outcome) => {
                debug!("Feed cycle outcome: {:?}", outcome);
                Some(outcome)
            }
            Err(e) => {
                error!("Feed cycle failed: {:#}", e);
                None
            }
        }
    }

    async fn cycle(&self) -> Result<CycleOutcome> {
        info!("Feed cycle started at {}", Utc::now().to_rfc3339());

        let matches = self
            .feed
            .live_matches()
            .await
            .context("Failed to load live matches")?;

        if matches.is_empty() {
            info!("No matches data found");
            return Ok(CycleOutcome::NoMatches);
        }
        info!("Found {} matches", matches.len());

        let scorecards = self.collect_scorecards(&matches).await;
        let commentary = self.collect_commentary(&matches).await;

        let report = CycleReport {
            matches: matches.len(),
            scorecards: scorecards.len(),
            commentaries_with_events: commentary.iter().filter(|c| !c.events.is_empty()).count(),
        };

        let docs = vec![
            Document::new(COLLECTION, MATCHES_DOC, &matches)?,
            Document::new(COLLECTION, SCORECARD_DOC, &scorecards)?,
            Document::new(COLLECTION, COMMENTARY_DOC, &commentary)?,
        ];
        self.store
            .write_batch(docs)
            .await
            .context("Failed to write feed documents")?;

        info!(
            "Feed cycle complete: {} matches, {} scorecards, {} with commentary",
            report.matches, report.scorecards, report.commentaries_with_events
        );
        Ok(CycleOutcome::Completed(report))
    }

    /// One entry per match with a scorecard link; failed pages become empty scorecards.
    async fn collect_scorecards(&self, matches: &[MatchSummary]) -> Vec<Scorecard> {
        let mut scorecards = Vec::new();

        for summary in matches.iter().filter(|m| m.has_scorecard()) {
            match self.feed.scorecard(summary).await {
                Ok(card) => scorecards.push(card),
                Err(e) => {
                    warn!(
                        "Scorecard for {} unavailable: {:#}",
                        summary.display_name(),
                        e
                    );
                    scorecards.push(Scorecard::empty(summary.display_name()));
                }
            }
            pause(self.pacing.scorecard_delay).await;
        }

        scorecards
    }

    /// One entry per listed match, in listing order.
    async fn collect_commentary(&self, matches: &[MatchSummary]) -> Vec<MatchCommentary> {
        let mut out = Vec::with_capacity(matches.len());
        let last = matches.len().saturating_sub(1);

        for (index, summary) in matches.iter().enumerate() {
            let name = summary.display_name();

            let Some(match_id) = summary
                .has_scorecard()
                .then(|| extract_match_id(&summary.scorecard_links))
                .flatten()
            else {
                debug!("No match id for {}, storing empty commentary", name);
                out.push(MatchCommentary::empty(name));
                continue;
            };

            let innings = self.feed.current_innings(&match_id).await;
            let payload = self.feed.commentary(&match_id, &innings).await;
            let extraction = extract_events_from_value(payload.as_ref());
            debug!(
                "Match {} innings {}: {} events",
                match_id,
                innings,
                extraction.events.len()
            );
            out.push(MatchCommentary::new(name, extraction));

            if index < last {
                pause(self.pacing.match_delay(index) + jitter(self.pacing.match_delay_jitter))
                    .await;
            }
        }

        out
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
