//! Cross-platform track matching
//!
//! [`scorer`] rates a single source/candidate pair, [`TrackMatcher`] runs
//! the catalog search for one source track and picks the best candidate.

mod matcher;
mod normalize;
mod outcome;
pub mod scorer;

pub use matcher::TrackMatcher;
pub use normalize::{normalize_name, normalize_title, strip_bracketed, token_overlap};
pub use outcome::{MatchOutcome, MatchResult, UnmatchedReason};
pub use scorer::{score, ScoreBreakdown, DEFAULT_MATCH_THRESHOLD};
