//! Per-track match outcomes

use std::fmt;

use serde::Serialize;

use crate::track::{CandidateTrack, Track};

/// Why a source track has no destination equivalent
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// The source title was empty after normalization
    MissingTitle,
    /// Every search query returned no results
    NoCandidates,
    /// Candidates were found but none reached the threshold
    BelowThreshold { best_score: f64 },
    /// The catalog search kept failing after retries
    SearchFailed { error: String },
    /// The track matched but could not be appended after retries
    WriteFailed { error: String },
}

impl UnmatchedReason {
    /// Whether the track was lost to an I/O failure rather than a miss
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::SearchFailed { .. } | Self::WriteFailed { .. })
    }
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "missing title"),
            Self::NoCandidates => write!(f, "no candidates found"),
            Self::BelowThreshold { best_score } => {
                write!(f, "best candidate scored {:.2}", best_score)
            }
            Self::SearchFailed { error } => write!(f, "search failed: {}", error),
            Self::WriteFailed { error } => write!(f, "append failed: {}", error),
        }
    }
}

/// Resolution of one source track
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched { candidate: CandidateTrack, score: f64 },
    Unmatched { reason: UnmatchedReason },
}

impl MatchOutcome {
    pub fn unmatched(reason: UnmatchedReason) -> Self {
        Self::Unmatched { reason }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn candidate(&self) -> Option<&CandidateTrack> {
        match self {
            Self::Matched { candidate, .. } => Some(candidate),
            Self::Unmatched { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&UnmatchedReason> {
        match self {
            Self::Matched { .. } => None,
            Self::Unmatched { reason } => Some(reason),
        }
    }
}

/// Outcome for the source track at `index`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Position of the source track in the request
    pub index: usize,
    pub source: Track,
    pub outcome: MatchOutcome,
}

impl MatchResult {
    pub fn new(index: usize, source: Track, outcome: MatchOutcome) -> Self {
        Self {
            index,
            source,
            outcome,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.outcome.is_matched()
    }

    /// Replace a match with a write failure, keeping the source
    pub(crate) fn downgrade_to_write_failed(&mut self, error: &str) {
        self.outcome = MatchOutcome::unmatched(UnmatchedReason::WriteFailed {
            error: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::Platform;

    #[test]
    fn test_reason_display() {
        assert_eq!(UnmatchedReason::NoCandidates.to_string(), "no candidates found");
        assert_eq!(
            UnmatchedReason::BelowThreshold { best_score: 0.4 }.to_string(),
            "best candidate scored 0.40"
        );
        assert!(UnmatchedReason::SearchFailed {
            error: "Request timed out".to_string()
        }
        .is_failure());
        assert!(!UnmatchedReason::NoCandidates.is_failure());
    }

    #[test]
    fn test_downgrade_keeps_source() {
        let source = Track::new(Platform::Spotify, "1", "Song", vec![]);
        let candidate = CandidateTrack::new("yt1", source.clone());
        let mut result = MatchResult::new(
            0,
            source.clone(),
            MatchOutcome::Matched {
                candidate,
                score: 0.9,
            },
        );
        assert!(result.is_matched());

        result.downgrade_to_write_failed("Rate limited by platform");
        assert!(!result.is_matched());
        assert_eq!(result.source, source);
        assert!(matches!(
            result.outcome.reason(),
            Some(UnmatchedReason::WriteFailed { .. })
        ));
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let outcome = MatchOutcome::unmatched(UnmatchedReason::NoCandidates);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "unmatched");
        assert_eq!(json["reason"]["reason"], "no_candidates");
    }
}
