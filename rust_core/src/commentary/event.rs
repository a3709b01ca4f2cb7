//! Display tokens for deliveries and the reader-side parser for event strings.

use super::Delivery;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Leading token of an event string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallOutcome {
    Wicket,
    Six,
    Four,
    /// Runs off the delivery including extras.
    Runs(i64),
}

impl BallOutcome {
    pub fn from_delivery(delivery: &Delivery) -> Self {
        match delivery.event.as_deref() {
            Some("WICKET") => BallOutcome::Wicket,
            Some("SIX") => BallOutcome::Six,
            Some("FOUR") => BallOutcome::Four,
            _ => BallOutcome::Runs(delivery.total_runs.unwrap_or(0)),
        }
    }

    /// Inverse of `Display`. Note `"4"` and `"6"` always read back as boundaries.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "W" => Some(BallOutcome::Wicket),
            "6" => Some(BallOutcome::Six),
            "4" => Some(BallOutcome::Four),
            other => other.parse().ok().map(BallOutcome::Runs),
        }
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, BallOutcome::Four | BallOutcome::Six)
    }
}

impl fmt::Display for BallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BallOutcome::Wicket => f.write_str("W"),
            BallOutcome::Six => f.write_str("6"),
            BallOutcome::Four => f.write_str("4"),
            BallOutcome::Runs(n) => write!(f, "{}", n),
        }
    }
}

/// An event string split back into its display fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentaryEvent {
    pub runs: String,
    pub bowler: String,
    pub batsman: String,
    pub outcome: String,
}

impl CommentaryEvent {
    pub fn outcome_kind(&self) -> Option<BallOutcome> {
        BallOutcome::from_token(&self.runs)
    }
}

/// Cricbuzz inlines formatting placeholders such as `B0$` into commText.
fn strip_bold_markers(text: &str) -> String {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    match RE.get_or_init(|| Regex::new(r"B[0-1]\$").ok()) {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_string(),
    }
}

/// Split `"<token>[, <bowler> to <batsman>, <outcome>]"` into fields.
///
/// Only the first comma delimits the token; the commentary text may contain
/// more. Bowler and batsman are only filled when the first segment of the
/// text has a `" to "` separator.
pub fn parse_event(event: &str) -> CommentaryEvent {
    let Some((runs, rest)) = event.split_once(", ") else {
        return CommentaryEvent {
            runs: event.trim().to_string(),
            ..Default::default()
        };
    };

    let (bowler, batsman, outcome) = match rest.split_once(", ") {
        Some((head, tail)) => match head.split_once(" to ") {
            Some((bowler, batsman)) => (bowler, batsman, tail),
            None => ("", "", rest),
        },
        None => ("", "", rest),
    };

    CommentaryEvent {
        runs: runs.trim().to_string(),
        bowler: bowler.trim().to_string(),
        batsman: batsman.trim().to_string(),
        outcome: strip_bold_markers(outcome).trim().to_string(),
    }
}
