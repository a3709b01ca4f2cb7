//! HTML extraction for Cricbuzz pages.
//!
//! Pure functions over page source; fetching lives in [`crate::clients`].
//! Extraction is positional and tied to the current Cricbuzz markup, so
//! missing elements produce empty strings rather than errors.

pub mod matches;
pub mod scorecard;

pub use matches::parse_live_matches;
pub use scorecard::parse_scorecard;

use anyhow::{anyhow, Result};
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::OnceLock;

pub(crate) fn sel(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {:?}: {:?}", css, e))
}

/// Trimmed text of a single element.
pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Concatenated, trimmed text of every match under `el`; `None` if nothing matches.
pub(crate) fn find_text(el: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let mut found = el.select(selector).peekable();
    found.peek()?;
    Some(found.flat_map(|e| e.text()).collect::<String>().trim().to_string())
}

/// Trimmed text of the `n`th match under `el`, or empty.
pub(crate) fn nth_text(el: ElementRef<'_>, selector: &Selector, n: usize) -> String {
    el.select(selector).nth(n).map(text_of).unwrap_or_default()
}

/// Drop a non-breaking space and whatever is glued to it (`"3rd ODI\u{a0}•"`).
pub(crate) fn strip_nbsp_suffix(text: &str) -> String {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    match RE.get_or_init(|| Regex::new(r"(?:&nbsp;|\x{a0})\S*").ok()) {
        Some(re) => re.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// Match id from a scorecard link such as `/live-cricket-scorecard/91798/ind-vs-aus`.
///
/// The id is the first all-digit path segment longer than four characters.
pub fn extract_match_id(link: &str) -> Option<String> {
    link.split('/')
        .find(|part| part.len() > 4 && part.bytes().all(|b| b.is_ascii_digit()))
        .map(str::to_string)
}
