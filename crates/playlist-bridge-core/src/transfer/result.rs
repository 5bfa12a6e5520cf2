//! Transfer job output

use serde::Serialize;

use crate::matching::MatchResult;
use crate::transfer::direction::TransferDirection;

/// Outcome of a completed transfer
///
/// `outcomes` holds one entry per source track in source order;
/// `matched` and `total` are derived from it on construction.
#[derive(Debug, Clone, Serialize)]
pub struct TransferResult {
    /// Id of the playlist on the destination platform
    pub playlist_id: String,
    pub title: String,
    pub direction: TransferDirection,
    /// Tracks present in the destination playlist
    pub matched: usize,
    /// Tracks in the source playlist
    pub total: usize,
    pub outcomes: Vec<MatchResult>,
}

impl TransferResult {
    pub fn new(
        playlist_id: String,
        title: String,
        direction: TransferDirection,
        outcomes: Vec<MatchResult>,
    ) -> Self {
        let matched = outcomes.iter().filter(|r| r.is_matched()).count();
        Self {
            playlist_id,
            title,
            direction,
            matched,
            total: outcomes.len(),
            outcomes,
        }
    }

    /// Tracks that did not make it into the destination playlist
    pub fn skipped(&self) -> usize {
        self.total - self.matched
    }

    /// Fraction of source tracks matched, 1.0 for an empty playlist
    pub fn match_rate(&self) -> f64 {
        match_rate(self.matched, self.total)
    }

    /// Whether every source track was transferred
    pub fn is_complete(&self) -> bool {
        self.matched == self.total
    }

    /// Destination ids in playlist order
    pub fn destination_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|r| r.outcome.candidate())
            .map(|c| c.destination_id.as_str())
            .collect()
    }

    /// Tracks lost to search or write failures rather than misses
    pub fn failures(&self) -> impl Iterator<Item = &MatchResult> {
        self.outcomes
            .iter()
            .filter(|r| r.outcome.reason().is_some_and(|reason| reason.is_failure()))
    }
}

/// Matching preview produced without touching the destination playlist
#[derive(Debug, Clone, Serialize)]
pub struct DryRunResult {
    pub direction: TransferDirection,
    pub matched: usize,
    pub total: usize,
    pub outcomes: Vec<MatchResult>,
}

impl DryRunResult {
    pub fn new(direction: TransferDirection, outcomes: Vec<MatchResult>) -> Self {
        let matched = outcomes.iter().filter(|r| r.is_matched()).count();
        Self {
            direction,
            matched,
            total: outcomes.len(),
            outcomes,
        }
    }

    pub fn skipped(&self) -> usize {
        self.total - self.matched
    }

    pub fn match_rate(&self) -> f64 {
        match_rate(self.matched, self.total)
    }
}

fn match_rate(matched: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        matched as f64 / total as f64
    }
}
