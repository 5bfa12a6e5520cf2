//! Finding the destination equivalent of a single source track

use std::sync::Arc;
use std::time::Duration;

use crate::config::MatchConfig;
use crate::error::{Error, PortError, Result};
use crate::matching::normalize::normalize_title;
use crate::matching::outcome::{MatchOutcome, MatchResult, UnmatchedReason};
use crate::matching::scorer;
use crate::port::{CatalogSearch, RateLimiter};
use crate::retry::{with_retry, RetryPolicy};
use crate::track::{CandidateTrack, Platform, Track};

/// Searches one destination catalog and picks the best candidate per track
pub struct TrackMatcher {
    search: Arc<dyn CatalogSearch>,
    platform: Platform,
    config: MatchConfig,
    retry: RetryPolicy,
    call_timeout: Duration,
    limiter: Option<Arc<RateLimiter>>,
}

impl TrackMatcher {
    /// Create a matcher with default settings
    pub fn new(search: Arc<dyn CatalogSearch>, platform: Platform) -> Self {
        Self {
            search,
            platform,
            config: MatchConfig::default(),
            retry: RetryPolicy::default(),
            call_timeout: Duration::from_secs(10),
            limiter: None,
        }
    }

    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Take a slot from `limiter` before every search attempt
    pub fn with_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Destination platform this matcher searches
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Resolve the source track at `index`
    ///
    /// Misses and exhausted search retries become `Unmatched` outcomes.
    /// Only an expired destination token is returned as an error.
    pub async fn match_track(&self, index: usize, source: &Track) -> Result<MatchResult> {
        let queries = self.queries(source);
        if queries.is_empty() {
            tracing::debug!(index, "Skipping track without a usable title");
            return Ok(MatchResult::new(
                index,
                source.clone(),
                MatchOutcome::unmatched(UnmatchedReason::MissingTitle),
            ));
        }

        let mut candidates = Vec::new();
        for query in &queries {
            match self.run_search(query).await {
                Ok(found) if found.is_empty() => {
                    tracing::debug!(index, query = %query, "No results");
                }
                Ok(found) => {
                    candidates = found;
                    break;
                }
                Err(PortError::AuthExpired) => {
                    return Err(Error::AuthExpired {
                        platform: self.platform,
                    });
                }
                Err(err) => {
                    tracing::warn!(index, track = %source.display_name(), error = %err, "Search failed");
                    return Ok(MatchResult::new(
                        index,
                        source.clone(),
                        MatchOutcome::unmatched(UnmatchedReason::SearchFailed {
                            error: err.to_string(),
                        }),
                    ));
                }
            }
        }

        let outcome = self.select_best(source, candidates);
        match &outcome {
            MatchOutcome::Matched { candidate, score } => tracing::debug!(
                index,
                track = %source.display_name(),
                matched = %candidate.track.display_name(),
                score,
                "Matched"
            ),
            MatchOutcome::Unmatched { reason } => tracing::debug!(
                index,
                track = %source.display_name(),
                %reason,
                "Unmatched"
            ),
        }

        Ok(MatchResult::new(index, source.clone(), outcome))
    }

    /// Search queries to try in order
    ///
    /// Title + primary artist, first with the destination's search
    /// decoration (YouTube: "official audio") when it has one, then
    /// plain, then the title alone.
    pub fn queries(&self, source: &Track) -> Vec<String> {
        let title = source.title().split_whitespace().collect::<Vec<_>>().join(" ");
        if normalize_title(&title).is_empty() {
            return Vec::new();
        }

        let artist = source.primary_artist();
        let base = match artist {
            Some(artist) => format!("{} {}", title, artist),
            None => title.clone(),
        };

        let mut queries = Vec::with_capacity(3);
        if let Some(suffix) = self.platform.search_suffix() {
            queries.push(format!("{} {}", base, suffix));
        }
        queries.push(base);
        if artist.is_some() && self.config.title_only_fallback {
            queries.push(title);
        }
        queries
    }

    /// Score the top-K candidates and pick the best one above threshold
    ///
    /// On equal scores the candidate listed first by the search wins.
    pub fn select_best(&self, source: &Track, candidates: Vec<CandidateTrack>) -> MatchOutcome {
        if candidates.is_empty() {
            return MatchOutcome::unmatched(UnmatchedReason::NoCandidates);
        }

        let mut best: Option<(CandidateTrack, f64)> = None;
        let mut best_rejected = 0.0f64;

        for candidate in candidates.into_iter().take(self.config.top_k) {
            let score = scorer::score(source, &candidate);
            if score < self.config.threshold {
                best_rejected = best_rejected.max(score);
                continue;
            }
            let better = best.as_ref().map_or(true, |(_, best_score)| score > *best_score);
            if better {
                best = Some((candidate, score));
            }
        }

        match best {
            Some((candidate, score)) => MatchOutcome::Matched { candidate, score },
            None => MatchOutcome::unmatched(UnmatchedReason::BelowThreshold {
                best_score: best_rejected,
            }),
        }
    }

    async fn run_search(&self, query: &str) -> std::result::Result<Vec<CandidateTrack>, PortError> {
        let limit = self.config.top_k;
        let search = &self.search;
        let platform = self.platform;
        let limiter = self.limiter.as_deref();
        let mut found = with_retry(
            &self.retry,
            self.call_timeout,
            limiter,
            "catalog search",
            move || search.search(query, platform, limit),
        )
        .await?;
        found.truncate(limit);
        Ok(found)
    }
}
