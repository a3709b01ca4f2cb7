//! Scorecard page: batting, bowling and innings totals.

use super::{find_text, nth_text, sel, text_of};
use crate::models::{Batter, Bowler, Innings, Scorecard};
use anyhow::Result;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

struct ScorecardSelectors {
    title: Selector,
    innings: Selector,
    header: Selector,
    item: Selector,
    batter_link: Selector,
    dismissal: Selector,
    batter_runs: Selector,
    right_cols: Selector,
    right_wide_cols: Selector,
    extras_runs: Selector,
    total_runs: Selector,
    breakdown: Selector,
    yet_to_bat: Selector,
    fall_of_wickets: Selector,
    bowler_link: Selector,
}

impl ScorecardSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            title: sel(".cb-nav-hdr.cb-font-18.line-ht24")?,
            innings: sel(r#"[id^="innings_"]"#)?,
            header: sel(".cb-scrd-hdr-rw span")?,
            item: sel(".cb-scrd-itms")?,
            batter_link: sel(".cb-col-25 a")?,
            dismissal: sel(".cb-col-33")?,
            batter_runs: sel(".cb-col-8.text-right.text-bold")?,
            right_cols: sel(".cb-col-8.text-right")?,
            right_wide_cols: sel(".cb-col-10.text-right")?,
            extras_runs: sel(".cb-col.cb-col-8.text-bold.cb-text-black.text-right")?,
            total_runs: sel(".cb-col.cb-col-8.text-bold.text-black.text-right")?,
            breakdown: sel(".cb-col-32.cb-col")?,
            yet_to_bat: sel(".cb-col-73.cb-col")?,
            fall_of_wickets: sel(".cb-col.cb-col-100.cb-col-rt.cb-font-13")?,
            bowler_link: sel(".cb-col-38 a")?,
        })
    }
}

/// Parse a scorecard page. `fallback_name` is used when the page has no title.
pub fn parse_scorecard(html: &str, fallback_name: &str) -> Result<Scorecard> {
    let document = Html::parse_document(html);
    let s = ScorecardSelectors::new()?;

    let name = document
        .select(&s.title)
        .next()
        .map(text_of)
        .map(|title| title.split('-').next().unwrap_or_default().trim().to_string())
        .unwrap_or_else(|| fallback_name.to_string());

    let innings = document
        .select(&s.innings)
        .map(|block| parse_innings(block, &s))
        .collect();

    Ok(Scorecard { name, innings })
}

fn parse_innings(block: ElementRef<'_>, s: &ScorecardSelectors) -> Innings {
    let items: Vec<ElementRef<'_>> = block.select(&s.item).collect();

    Innings {
        innings_name: find_text(block, &s.header).unwrap_or_else(|| "Unknown Team".to_string()),
        batters: items.iter().filter_map(|item| parse_batter(*item, s)).collect(),
        extras: summary_row(&items, &s.extras_runs, &s.breakdown),
        total: summary_row(&items, &s.total_runs, &s.breakdown),
        yet_to_bat: items
            .iter()
            .flat_map(|item| item.select(&s.yet_to_bat).map(text_of))
            .filter(|name| !name.is_empty() && name != "Yet to Bat")
            .collect(),
        fall_of_wickets: block
            .select(&s.fall_of_wickets)
            .map(text_of)
            .filter(|w| !w.is_empty())
            .collect(),
        bowlers: items.iter().filter_map(|item| parse_bowler(*item, s)).collect(),
    }
}

fn is_summary_label(name: &str) -> bool {
    name == "Extras" || name == "Total"
}

/// Remove annotations such as `(c)` or `(wk)` from a player name.
fn clean_player_name(name: &str) -> String {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    match RE.get_or_init(|| Regex::new(r"\s*\([^)]*\)").ok()) {
        Some(re) => re.replace_all(name, "").trim().to_string(),
        None => name.trim().to_string(),
    }
}

fn parse_batter(item: ElementRef<'_>, s: &ScorecardSelectors) -> Option<Batter> {
    let name = find_text(item, &s.batter_link)?;
    if is_summary_label(&name) {
        return None;
    }

    // Right-aligned columns: runs, balls, 4s, 6s, strike rate.
    Some(Batter {
        name: clean_player_name(&name),
        status: find_text(item, &s.dismissal).unwrap_or_default(),
        runs: find_text(item, &s.batter_runs).unwrap_or_default(),
        balls: nth_text(item, &s.right_cols, 1),
        fours: nth_text(item, &s.right_cols, 2),
        sixes: nth_text(item, &s.right_cols, 3),
        strike_rate: nth_text(item, &s.right_cols, 4),
    })
}

fn parse_bowler(item: ElementRef<'_>, s: &ScorecardSelectors) -> Option<Bowler> {
    let bowler_name = find_text(item, &s.bowler_link)?;
    if is_summary_label(&bowler_name) {
        return None;
    }

    Some(Bowler {
        bowler_name,
        overs: nth_text(item, &s.right_cols, 0),
        maiden: nth_text(item, &s.right_cols, 1),
        runs: nth_text(item, &s.right_wide_cols, 0),
        wickets: nth_text(item, &s.right_cols, 2),
        no_balls: nth_text(item, &s.right_cols, 3),
        wide_balls: nth_text(item, &s.right_cols, 4),
        economy: nth_text(item, &s.right_wide_cols, 1),
    })
}

/// Extras/total row: the bold figure followed by its breakdown, from the first matching item.
fn summary_row(items: &[ElementRef<'_>], figure: &Selector, breakdown: &Selector) -> String {
    items
        .iter()
        .find_map(|item| {
            let runs = find_text(*item, figure)?;
            let detail = find_text(*item, breakdown).unwrap_or_default();
            Some(runs + &detail)
        })
        .unwrap_or_default()
}
