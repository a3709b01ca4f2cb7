use serde::Serialize;

/// Counts for one finished cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub matches: usize,
    pub scorecards: usize,
    pub commentaries_with_events: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Documents written
    Completed(CycleReport),
    /// Live-scores page listed nothing; previous documents left in place
    NoMatches,
    /// Another cycle was still running
    Skipped,
}
