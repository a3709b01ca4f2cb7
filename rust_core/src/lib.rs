//! Cricket feed core - scraping and summarizing live cricket data.
//!
//! This crate provides:
//! - Ball-by-ball commentary summarization (`commentary`)
//! - Cricbuzz HTTP client with retry and circuit breaking (`clients`)
//! - HTML extraction for live-score and scorecard pages (`scrape`)
//! - The `CricketFeed` provider trait (`providers`)
//! - Document storage backends (`store`)

pub mod circuit_breaker;
pub mod clients;
pub mod commentary;
pub mod models;
pub mod providers;
pub mod retry;
pub mod scrape;
pub mod store;

pub use commentary::{extract_events, parse_event, CommentaryPayload, Extraction, MAX_EVENTS};
pub use providers::CricketFeed;
pub use store::DocumentStore;
