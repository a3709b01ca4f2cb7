//! Live-scores page: one [`MatchSummary`] per match card.

use super::{find_text, nth_text, sel, strip_nbsp_suffix};
use crate::models::{MatchSummary, TeamsLine};
use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

const CARD: &str = ".cb-col.cb-col-100.cb-bg-white .cb-mtch-lst.cb-col.cb-col-100.cb-tms-itm";

struct CardSelectors {
    title: Selector,
    match_no: Selector,
    date_stadium: Selector,
    live_score: Selector,
    scorecard: Selector,
    commentary: Selector,
    live: Selector,
    complete: Selector,
    preview: Selector,
    team_cells: Selector,
}

impl CardSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            title: sel("a.text-hvr-underline.text-bold")?,
            match_no: sel("span.text-gray")?,
            date_stadium: sel("div.text-gray")?,
            live_score: sel(r#"a[title="Live Score"]"#)?,
            scorecard: sel(r#"a[title="Scorecard"]"#)?,
            commentary: sel(r#"a[title="Full Commentary"]"#)?,
            live: sel(".cb-text-live")?,
            complete: sel(".cb-text-complete")?,
            preview: sel("span.cb-text-preview")?,
            team_cells: sel(".cb-ovr-flo")?,
        })
    }
}

/// Parse every match card of the live-scores page.
///
/// A page without the match container yields an empty list.
pub fn parse_live_matches(html: &str) -> Result<Vec<MatchSummary>> {
    let document = Html::parse_document(html);
    let card = sel(CARD)?;
    let s = CardSelectors::new()?;

    let matches: Vec<MatchSummary> = document.select(&card).map(|c| parse_card(c, &s)).collect();
    if matches.is_empty() {
        debug!("No match cards found on live-scores page");
    }
    Ok(matches)
}

fn parse_card(card: ElementRef<'_>, s: &CardSelectors) -> MatchSummary {
    MatchSummary {
        name: find_text(card, &s.title).unwrap_or_default(),
        status: find_text(card, &s.match_no)
            .map(|t| strip_nbsp_suffix(&t))
            .unwrap_or_default(),
        date_stadium: find_text(card, &s.date_stadium)
            .map(|t| strip_nbsp_suffix(&t))
            .unwrap_or_default(),
        live_score: href(card, &s.live_score),
        scorecard_links: href(card, &s.scorecard),
        commentary: href(card, &s.commentary),
        teams: parse_teams(card, s),
    }
}

fn href(card: ElementRef<'_>, selector: &Selector) -> String {
    card.select(selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .unwrap_or_default()
        .to_string()
}

fn parse_teams(card: ElementRef<'_>, s: &CardSelectors) -> TeamsLine {
    let match_status = find_text(card, &s.live)
        .or_else(|| find_text(card, &s.complete))
        .or_else(|| find_text(card, &s.preview))
        .unwrap_or_default();

    // Cell 0 is the header; then team/score pairs.
    TeamsLine {
        team1: nth_text(card, &s.team_cells, 1),
        score1: nth_text(card, &s.team_cells, 2),
        team2: nth_text(card, &s.team_cells, 3),
        score2: nth_text(card, &s.team_cells, 4),
        match_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<div class="cb-col cb-col-100 cb-bg-white">
  <div class="cb-mtch-lst cb-col cb-col-100 cb-tms-itm">
    <h3><a class="text-hvr-underline text-bold" href="/x">India vs Australia, </a></h3>
    <span class="text-gray">3rd ODI&nbsp;•</span>
    <div class="text-gray">Today • Wankhede Stadium, Mumbai</div>
    <div class="cb-ovr-flo">header</div>
    <div class="cb-ovr-flo">IND</div>
    <div class="cb-ovr-flo">287-6 (50)</div>
    <div class="cb-ovr-flo">AUS</div>
    <div class="cb-ovr-flo">112-3 (21.4)</div>
    <div class="cb-text-live">Australia need 176 runs</div>
    <a title="Live Score" href="/live-cricket-scores/91798/ind-vs-aus">Live Score</a>
    <a title="Scorecard" href="/live-cricket-scorecard/91798/ind-vs-aus">Scorecard</a>
    <a title="Full Commentary" href="/cricket-full-commentary/91798/ind-vs-aus">Full Commentary</a>
  </div>
  <div class="cb-mtch-lst cb-col cb-col-100 cb-tms-itm">
    <h3><a class="text-hvr-underline text-bold" href="/y">England vs Pakistan, </a></h3>
    <span class="cb-text-preview">Match starts at 10:00 GMT</span>
  </div>
</div>
</body></html>"#;

    #[test]
    fn test_parse_live_card() {
        let matches = parse_live_matches(PAGE).unwrap();
        assert_eq!(matches.len(), 2);

        let m = &matches[0];
        assert_eq!(m.name, "India vs Australia,");
        assert_eq!(m.status, "3rd ODI");
        assert_eq!(m.date_stadium, "Today • Wankhede Stadium, Mumbai");
        assert_eq!(m.scorecard_links, "/live-cricket-scorecard/91798/ind-vs-aus");
        assert_eq!(m.live_score, "/live-cricket-scores/91798/ind-vs-aus");
        assert_eq!(m.commentary, "/cricket-full-commentary/91798/ind-vs-aus");
        assert_eq!(m.teams.team1, "IND");
        assert_eq!(m.teams.score1, "287-6 (50)");
        assert_eq!(m.teams.team2, "AUS");
        assert_eq!(m.teams.score2, "112-3 (21.4)");
        assert_eq!(m.teams.match_status, "Australia need 176 runs");
    }

    #[test]
    fn test_parse_preview_card_defaults() {
        let matches = parse_live_matches(PAGE).unwrap();
        let m = &matches[1];
        assert_eq!(m.name, "England vs Pakistan,");
        assert_eq!(m.teams.match_status, "Match starts at 10:00 GMT");
        assert!(m.scorecard_links.is_empty());
        assert!(m.teams.team1.is_empty());
        assert!(!m.has_scorecard());
    }

    #[test]
    fn test_page_without_container() {
        let matches = parse_live_matches("<html><body><p>maintenance</p></body></html>").unwrap();
        assert!(matches.is_empty());
    }
}
