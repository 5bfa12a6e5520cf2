//! Similarity scoring between a source track and a destination candidate

use std::time::Duration;

use strsim::normalized_levenshtein;

use crate::matching::normalize::{normalize_name, normalize_title, token_overlap};
use crate::track::{CandidateTrack, Track};

/// Weight of the title term in the final score
pub const TITLE_WEIGHT: f64 = 0.55;
/// Weight of the artist term in the final score
pub const ARTIST_WEIGHT: f64 = 0.30;
/// Weight of the duration term in the final score
pub const DURATION_WEIGHT: f64 = 0.15;

/// Default minimum score for a candidate to be accepted
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.55;

/// Durations within this many seconds count as identical
const DURATION_TOLERANCE_SECS: f64 = 3.0;
/// Duration similarity reaches zero at this delta
const DURATION_CUTOFF_SECS: f64 = 20.0;
/// Duration term used when either side has no duration
const UNKNOWN_DURATION_SCORE: f64 = 0.5;

/// Per-component similarity values, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub title: f64,
    pub artist: f64,
    pub duration: f64,
}

impl ScoreBreakdown {
    /// Weighted sum of the components
    pub fn total(&self) -> f64 {
        let total = TITLE_WEIGHT * self.title
            + ARTIST_WEIGHT * self.artist
            + DURATION_WEIGHT * self.duration;
        total.clamp(0.0, 1.0)
    }
}

/// Score how likely `candidate` is the same recording as `source`
///
/// Pure and deterministic: the result depends only on the two tracks.
pub fn score(source: &Track, candidate: &CandidateTrack) -> f64 {
    breakdown(source, candidate).total()
}

/// Compute the individual similarity components for a pair
pub fn breakdown(source: &Track, candidate: &CandidateTrack) -> ScoreBreakdown {
    let other = &candidate.track;
    ScoreBreakdown {
        title: title_similarity(source.title(), other.title()),
        artist: artist_similarity(source.artists(), other.artists()),
        duration: duration_similarity(source.duration(), other.duration()),
    }
}

/// Blend of token-set overlap and normalized edit distance on normalized titles
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_title(a);
    let b = normalize_title(b);

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    0.5 * token_overlap(&a, &b) + 0.5 * normalized_levenshtein(&a, &b)
}

/// 1.0 on any exact normalized name match, else the best pairwise token overlap
pub fn artist_similarity(source: &[String], candidate: &[String]) -> f64 {
    let source: Vec<String> = normalized_names(source);
    let candidate: Vec<String> = normalized_names(candidate);

    if source.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    if source.iter().any(|s| candidate.contains(s)) {
        return 1.0;
    }

    source
        .iter()
        .flat_map(|s| candidate.iter().map(move |c| token_overlap(s, c)))
        .fold(0.0, f64::max)
}

/// 1.0 within 3s, decaying linearly to 0.0 at a 20s delta
pub fn duration_similarity(a: Option<Duration>, b: Option<Duration>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return UNKNOWN_DURATION_SCORE;
    };

    let delta = (a.as_secs_f64() - b.as_secs_f64()).abs();
    if delta <= DURATION_TOLERANCE_SECS {
        1.0
    } else if delta >= DURATION_CUTOFF_SECS {
        0.0
    } else {
        (DURATION_CUTOFF_SECS - delta) / (DURATION_CUTOFF_SECS - DURATION_TOLERANCE_SECS)
    }
}

fn normalized_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|n| normalize_name(n))
        .filter(|n| !n.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::Platform;

    fn track(title: &str, artists: &[&str], secs: Option<u64>) -> Track {
        let t = Track::new(
            Platform::Spotify,
            "src",
            title,
            artists.iter().map(|a| a.to_string()).collect(),
        );
        match secs {
            Some(s) => t.with_duration(Duration::from_secs(s)),
            None => t,
        }
    }

    fn candidate(title: &str, artists: &[&str], secs: Option<u64>) -> CandidateTrack {
        CandidateTrack::new("dst", track(title, artists, secs))
    }

    #[test]
    fn test_remastered_candidate_scores_above_threshold() {
        let source = track("Yesterday", &["The Beatles"], Some(125));
        let cand = candidate("Yesterday - Remastered 2009", &["The Beatles"], Some(126));
        let s = score(&source, &cand);
        assert!(s >= DEFAULT_MATCH_THRESHOLD, "score was {}", s);
    }

    #[test]
    fn test_identical_tracks_score_one() {
        let source = track("Bohemian Rhapsody", &["Queen"], Some(354));
        let cand = candidate("Bohemian Rhapsody", &["Queen"], Some(354));
        assert!((score(&source, &cand) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unrelated_track_scores_below_threshold() {
        let source = track("Yesterday", &["The Beatles"], Some(125));
        let cand = candidate("Thunderstruck", &["AC/DC"], Some(292));
        assert!(score(&source, &cand) < DEFAULT_MATCH_THRESHOLD);
    }

    #[test]
    fn test_score_is_deterministic_and_bounded() {
        let source = track("Hey Jude", &["The Beatles"], Some(431));
        let cand = candidate("Hey Jude - Remastered", &["Beatles"], Some(440));
        let first = score(&source, &cand);
        for _ in 0..10 {
            assert_eq!(score(&source, &cand), first);
        }
        assert!((0.0..=1.0).contains(&first));
    }

    #[test]
    fn test_artist_similarity() {
        let one = |s: &str| vec![s.to_string()];
        assert_eq!(artist_similarity(&one("The Beatles"), &one("the beatles")), 1.0);
        assert_eq!(
            artist_similarity(
                &["Queen".to_string(), "David Bowie".to_string()],
                &one("David Bowie")
            ),
            1.0
        );
        assert_eq!(artist_similarity(&one("The Beatles"), &one("Beatles")), 0.5);
        assert_eq!(artist_similarity(&[], &one("Queen")), 0.0);
    }

    #[test]
    fn test_duration_similarity_decay() {
        let secs = |s: f64| Some(Duration::from_secs_f64(s));
        assert_eq!(duration_similarity(secs(100.0), secs(103.0)), 1.0);
        assert_eq!(duration_similarity(secs(100.0), secs(111.5)), 0.5);
        assert_eq!(duration_similarity(secs(100.0), secs(120.0)), 0.0);
        assert_eq!(duration_similarity(secs(100.0), secs(300.0)), 0.0);
        assert_eq!(duration_similarity(None, secs(100.0)), UNKNOWN_DURATION_SCORE);
    }

    #[test]
    fn test_title_similarity_partial() {
        let s = title_similarity("Hello World", "Hello");
        assert!(s > 0.0 && s < 1.0);
        assert_eq!(title_similarity("", "Hello"), 0.0);
        assert_eq!(title_similarity("Song (Live)", "song"), 1.0);
    }

    #[test]
    fn test_breakdown_total_matches_score() {
        let source = track("Yesterday", &["The Beatles"], None);
        let cand = candidate("Yesterday", &["The Beatles"], Some(126));
        let parts = breakdown(&source, &cand);
        assert_eq!(parts.title, 1.0);
        assert_eq!(parts.artist, 1.0);
        assert_eq!(parts.duration, UNKNOWN_DURATION_SCORE);
        assert_eq!(parts.total(), score(&source, &cand));
    }
}
