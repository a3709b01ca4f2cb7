// Shared document models for the cricket feed services
use crate::commentary::Extraction;
use chrono::{DateTime, Utc};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

/// Collection that holds every feed document.
pub const COLLECTION: &str = "cricket";

pub const MATCHES_DOC: &str = "matches";
pub const SCORECARD_DOC: &str = "scorecard";
pub const COMMENTARY_DOC: &str = "full_commentary";

pub const UNKNOWN_MATCH: &str = "Unknown Match";

// ============================================================================
// Live matches listing
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamsLine {
    #[serde(default)]
    pub team1: String,
    #[serde(default)]
    pub team2: String,
    #[serde(default)]
    pub score1: String,
    #[serde(default)]
    pub score2: String,
    #[serde(default)]
    pub match_status: String,
}

/// One card of the live-scores page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    #[serde(rename = "match", default)]
    pub name: String,
    /// Match number within the series, e.g. "3rd ODI".
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub date_stadium: String,
    #[serde(default)]
    pub live_score: String,
    #[serde(default)]
    pub scorecard_links: String,
    #[serde(default)]
    pub commentary: String,
    #[serde(default)]
    pub teams: TeamsLine,
}

impl MatchSummary {
    /// Name used in derived documents; never empty.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            UNKNOWN_MATCH
        } else {
            &self.name
        }
    }

    pub fn has_scorecard(&self) -> bool {
        !self.scorecard_links.is_empty()
    }
}

// ============================================================================
// Scorecard
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batter {
    pub name: String,
    pub status: String,
    pub runs: String,
    pub balls: String,
    #[serde(rename = "4s")]
    pub fours: String,
    #[serde(rename = "6s")]
    pub sixes: String,
    pub strike_rate: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bowler {
    pub bowler_name: String,
    pub overs: String,
    pub maiden: String,
    pub runs: String,
    pub wickets: String,
    pub no_balls: String,
    pub wide_balls: String,
    pub economy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Innings {
    pub innings_name: String,
    pub batters: Vec<Batter>,
    pub extras: String,
    pub total: String,
    pub yet_to_bat: Vec<String>,
    pub fall_of_wickets: Vec<String>,
    pub bowlers: Vec<Bowler>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scorecard {
    #[serde(rename = "match")]
    pub name: String,
    pub innings: Vec<Innings>,
}

impl Scorecard {
    /// Placeholder kept in the document when a scorecard page fails.
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            innings: Vec::new(),
        }
    }
}

// ============================================================================
// Commentary
// ============================================================================

/// Per-match entry of the `full_commentary` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchCommentary {
    #[serde(rename = "match")]
    pub name: String,
    /// Absent when unknown. Older documents store `""`; that reads as unknown too.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "over_or_blank"
    )]
    pub latest_over: Option<f64>,
    #[serde(default)]
    pub events: Vec<String>,
}

impl MatchCommentary {
    pub fn new(name: &str, extraction: Extraction) -> Self {
        Self {
            name: name.to_string(),
            latest_over: extraction.latest_over,
            events: extraction.events,
        }
    }

    pub fn empty(name: &str) -> Self {
        Self::new(name, Extraction::default())
    }

    /// Over label for display, `"N/A"` when unknown.
    pub fn over_label(&self) -> String {
        self.latest_over
            .map(|o| o.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

fn over_or_blank<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

// ============================================================================
// Stored documents
// ============================================================================

/// Envelope written for every document: `{ data, lastUpdated }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument<T> {
    pub data: T,
    pub last_updated: DateTime<Utc>,
}

impl<T> StoredDocument<T> {
    pub fn now(data: T) -> Self {
        Self {
            data,
            last_updated: Utc::now(),
        }
    }
}
