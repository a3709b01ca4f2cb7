//! Ball-by-ball commentary summarization.
//!
//! Turns a raw Cricbuzz `full-commentary` payload into the short event list
//! stored in the `full_commentary` document:
//! - Non-deliveries (`ballNbr` absent or `<= 0`) are dropped
//! - The newest deliveries are scanned first, capped at [`MAX_EVENTS`]
//! - The result is returned oldest-first, together with the latest over marker
//!
//! Extraction never fails. Missing or malformed input degrades to an empty
//! [`Extraction`]; the reason is logged.

pub mod event;

pub use event::{parse_event, BallOutcome, CommentaryEvent};

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use tracing::{debug, warn};

/// Number of deliveries kept per match.
pub const MAX_EVENTS: usize = 12;

/// One entry of a commentary list as returned by the match-center API.
///
/// Every field is optional and read leniently: a value of the wrong type is
/// treated as absent instead of rejecting the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    #[serde(default, deserialize_with = "lenient")]
    pub ball_nbr: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub over_number: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub event: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub comm_text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_runs: Option<i64>,
}

impl Delivery {
    /// Real deliveries carry a strictly positive ball number.
    pub fn is_delivery(&self) -> bool {
        self.ball_nbr.is_some_and(|n| n > 0)
    }

    /// Over marker, if present and non-zero.
    pub fn over_marker(&self) -> Option<f64> {
        self.over_number.filter(|o| *o != 0.0 && !o.is_nan())
    }

    /// Commentary text with surrounding whitespace removed.
    pub fn text(&self) -> &str {
        self.comm_text.as_deref().map(str::trim).unwrap_or_default()
    }

    /// Display string: `"<token>"` or `"<token>, <commText>"`.
    pub fn summarize(&self) -> String {
        let outcome = BallOutcome::from_delivery(self);
        match self.text() {
            "" => outcome.to_string(),
            text => format!("{}, {}", outcome, text),
        }
    }
}

/// Innings identifier as echoed by the API (sometimes a number, sometimes a string).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InningsId {
    Number(i64),
    Text(String),
}

impl fmt::Display for InningsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InningsId::Number(n) => write!(f, "{}", n),
            InningsId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentaryBlock {
    #[serde(default, deserialize_with = "lenient")]
    pub innings_id: Option<InningsId>,
    #[serde(default)]
    pub commentary_list: Option<Vec<Delivery>>,
}

/// Top-level `full-commentary` response. Only the first block is read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentaryPayload {
    #[serde(default)]
    pub commentary: Option<Vec<CommentaryBlock>>,
}

impl CommentaryPayload {
    /// Read a payload out of an arbitrary JSON value.
    ///
    /// Returns `None` (and logs) when the value does not have the payload shape.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match Self::deserialize(value) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("Malformed commentary payload: {}", e);
                None
            }
        }
    }

    pub fn first_block(&self) -> Option<&CommentaryBlock> {
        self.commentary.as_ref().and_then(|blocks| blocks.first())
    }

    /// Innings id reported by the first block, if any.
    pub fn innings_id(&self) -> Option<&InningsId> {
        self.first_block().and_then(|b| b.innings_id.as_ref())
    }

    fn deliveries(&self) -> Result<&[Delivery], &'static str> {
        let blocks = self.commentary.as_ref().ok_or("no commentary field")?;
        let first = blocks.first().ok_or("empty commentary list")?;
        first
            .commentary_list
            .as_deref()
            .ok_or("first commentary block has no commentaryList")
    }
}

/// Summary of the most recent deliveries of an innings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// Over marker of the newest delivery that carries one.
    pub latest_over: Option<f64>,
    /// At most [`MAX_EVENTS`] display strings, oldest first.
    pub events: Vec<String>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.latest_over.is_none()
    }
}

/// Summarize the newest deliveries of a commentary payload.
///
/// `latest_over` is taken from the first over-bearing delivery seen while
/// scanning newest-first, so it can belong to an older ball than the newest
/// event when that ball has no over marker.
pub fn extract_events(payload: Option<&CommentaryPayload>) -> Extraction {
    let Some(payload) = payload else {
        debug!("No commentary payload supplied");
        return Extraction::default();
    };

    let deliveries = match payload.deliveries() {
        Ok(list) => list,
        Err(reason) => {
            debug!("No commentary data found: {}", reason);
            return Extraction::default();
        }
    };

    let mut balls: Vec<&Delivery> = deliveries.iter().filter(|d| d.is_delivery()).collect();
    // Stable: deliveries sharing a ball number keep their input order.
    balls.sort_by_key(|d| Reverse(d.ball_nbr));

    let mut latest_over = None;
    let mut events = Vec::with_capacity(MAX_EVENTS.min(balls.len()));

    for ball in balls {
        if latest_over.is_none() {
            latest_over = ball.over_marker();
        }

        events.push(ball.summarize());

        if events.len() == MAX_EVENTS {
            break;
        }
    }

    // Chronological order for consumers.
    events.reverse();

    Extraction {
        latest_over,
        events,
    }
}

/// [`extract_events`] over an untyped JSON document.
pub fn extract_events_from_value(value: Option<&serde_json::Value>) -> Extraction {
    let payload = value.and_then(CommentaryPayload::from_value);
    extract_events(payload.as_ref())
}

/// Deserialize a field, mapping type mismatches to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(list: serde_json::Value) -> CommentaryPayload {
        serde_json::from_value(json!({ "commentary": [{ "inningsId": 2, "commentaryList": list }] }))
            .unwrap()
    }

    fn deliveries(n: i64) -> serde_json::Value {
        let list: Vec<_> = (1..=n)
            .map(|i| {
                json!({
                    "ballNbr": i,
                    "overNumber": (i / 6) as f64 + (i % 6) as f64 / 10.0,
                    "event": "",
                    "commText": format!("ball {}", i),
                    "totalRuns": 1,
                })
            })
            .collect();
        json!(list)
    }

    #[test]
    fn test_missing_payload_is_empty() {
        let result = extract_events(None);
        assert_eq!(result.latest_over, None);
        assert!(result.events.is_empty());
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_commentary_is_empty() {
        let p: CommentaryPayload = serde_json::from_value(json!({ "commentary": [] })).unwrap();
        assert_eq!(extract_events(Some(&p)), Extraction::default());

        let p: CommentaryPayload = serde_json::from_value(json!({})).unwrap();
        assert_eq!(extract_events(Some(&p)), Extraction::default());
    }

    #[test]
    fn test_block_without_list_is_empty() {
        let p: CommentaryPayload =
            serde_json::from_value(json!({ "commentary": [{ "inningsId": 1 }] })).unwrap();
        assert_eq!(extract_events(Some(&p)), Extraction::default());
    }

    #[test]
    fn test_wicket_scenario() {
        let p = payload(json!([
            { "ballNbr": 1, "event": "", "commText": "", "totalRuns": 1 },
            { "ballNbr": 2, "event": "", "commText": "", "totalRuns": 0 },
            { "ballNbr": 3, "event": "WICKET", "commText": "bowled him", "overNumber": 2.3 },
        ]));

        let result = extract_events(Some(&p));
        assert_eq!(result.latest_over, Some(2.3));
        assert_eq!(result.events, vec!["1", "0", "W, bowled him"]);
    }

    #[test]
    fn test_caps_at_twelve_newest() {
        let p = payload(deliveries(15));
        let result = extract_events(Some(&p));

        assert_eq!(result.events.len(), MAX_EVENTS);
        assert_eq!(result.events.first().unwrap(), "1, ball 4");
        assert_eq!(result.events.last().unwrap(), "1, ball 15");
    }

    #[test]
    fn test_latest_over_skips_unmarked_newest() {
        let p = payload(json!([
            { "ballNbr": 14, "overNumber": 2.2, "totalRuns": 0 },
            { "ballNbr": 15, "overNumber": 2.3, "totalRuns": 2 },
            { "ballNbr": 16, "commText": "Drinks break chatter", "totalRuns": 0 },
        ]));

        let result = extract_events(Some(&p));
        assert_eq!(result.latest_over, Some(2.3));
        assert_eq!(result.events.last().unwrap(), "0, Drinks break chatter");
    }

    #[test]
    fn test_zero_over_number_is_not_a_marker() {
        let p = payload(json!([
            { "ballNbr": 1, "overNumber": 0.1, "totalRuns": 0 },
            { "ballNbr": 2, "overNumber": 0, "totalRuns": 0 },
        ]));
        assert_eq!(extract_events(Some(&p)).latest_over, Some(0.1));
    }

    #[test]
    fn test_non_deliveries_are_dropped() {
        let p = payload(json!([
            { "ballNbr": 0, "event": "WICKET", "commText": "Innings break" },
            { "commText": "Players are out" },
            { "ballNbr": -1, "event": "SIX" },
            { "ballNbr": 1, "event": "FOUR", "commText": "" },
        ]));

        let result = extract_events(Some(&p));
        assert_eq!(result.events, vec!["4"]);
        assert_eq!(result.latest_over, None);
    }

    #[test]
    fn test_unsorted_input_is_ordered_by_ball() {
        let p = payload(json!([
            { "ballNbr": 3, "event": "SIX", "commText": "into the stands" },
            { "ballNbr": 1, "totalRuns": 0 },
            { "ballNbr": 2, "totalRuns": 5, "commText": "  overthrows  " },
        ]));

        let result = extract_events(Some(&p));
        assert_eq!(result.events, vec!["0", "5, overthrows", "6, into the stands"]);
    }

    #[test]
    fn test_duplicate_ball_numbers_keep_input_order() {
        let p = payload(json!([
            { "ballNbr": 1, "totalRuns": 0, "commText": "first" },
            { "ballNbr": 1, "totalRuns": 0, "commText": "second" },
        ]));

        // Newest-first scan keeps input order for ties, then the list is reversed.
        let result = extract_events(Some(&p));
        assert_eq!(result.events, vec!["0, second", "0, first"]);
    }

    #[test]
    fn test_wrong_field_types_are_tolerated() {
        let p = payload(json!([
            { "ballNbr": 1, "totalRuns": "four", "commText": 17 },
            { "ballNbr": "2", "totalRuns": 1 },
        ]));

        let result = extract_events(Some(&p));
        assert_eq!(result.events, vec!["0"]);
    }

    #[test]
    fn test_from_value_rejects_wrong_shape() {
        assert!(CommentaryPayload::from_value(&json!({ "commentary": "none" })).is_none());
        assert_eq!(
            extract_events_from_value(Some(&json!({ "commentary": 5 }))),
            Extraction::default()
        );
        assert_eq!(extract_events_from_value(None), Extraction::default());
    }

    #[test]
    fn test_innings_id_forms() {
        let p = payload(json!([]));
        assert_eq!(p.innings_id().map(ToString::to_string).as_deref(), Some("2"));

        let p: CommentaryPayload =
            serde_json::from_value(json!({ "commentary": [{ "inningsId": "3" }] })).unwrap();
        assert_eq!(p.innings_id(), Some(&InningsId::Text("3".to_string())));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let p = payload(deliveries(20));
        assert_eq!(extract_events(Some(&p)), extract_events(Some(&p)));
    }
}
