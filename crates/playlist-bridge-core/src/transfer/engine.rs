//! Transfer orchestration

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{Error, PortError, Result};
use crate::matching::{MatchOutcome, MatchResult, TrackMatcher, UnmatchedReason};
use crate::port::{PlatformPorts, PortRegistry};
use crate::retry::with_retry;
use crate::transfer::request::TransferRequest;
use crate::transfer::result::{DryRunResult, TransferResult};

/// Progress information for transfer callbacks
#[derive(Debug, Clone, Default)]
pub struct TransferProgress {
    /// Items finished in the current phase
    pub current: usize,
    /// Items in the current phase
    pub total: usize,
    /// Track (or playlist) most recently handled
    pub current_name: String,
    pub phase: TransferPhase,
    /// Elapsed time since the transfer started, in seconds
    pub elapsed_seconds: u64,
}

/// Phase of the transfer operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferPhase {
    /// Creating or looking up the destination playlist
    #[default]
    Creating,
    /// Searching the destination catalog
    Matching,
    /// Appending matched tracks
    Writing,
    /// Transfer complete
    Complete,
}

impl std::fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Creating => write!(f, "Creating playlist"),
            Self::Matching => write!(f, "Matching tracks"),
            Self::Writing => write!(f, "Adding tracks"),
            Self::Complete => write!(f, "Complete"),
        }
    }
}

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(TransferProgress) + Send + Sync>;

/// Drives a transfer job end to end
///
/// The engine creates the destination playlist, matches every source
/// track under a bounded worker pool, then appends the matches in source
/// order. Per-track failures end up in the result; only setup,
/// authentication and cancellation abort the job.
pub struct TransferEngine {
    ports: PortRegistry,
    config: Config,
    progress_callback: Option<ProgressCallback>,
    cancellation: CancellationToken,
}

impl TransferEngine {
    /// Create an engine with default configuration
    pub fn new(ports: PortRegistry) -> Self {
        Self {
            ports,
            config: Config::default(),
            progress_callback: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Start building an engine
    pub fn builder() -> TransferEngineBuilder {
        TransferEngineBuilder::new()
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the progress callback
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Set a cancellation token for aborting transfers
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Report progress to the callback if set
    fn report_progress(&self, progress: TransferProgress) {
        if let Some(ref callback) = self.progress_callback {
            callback(progress);
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancellation.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    fn ports_for(&self, request: &TransferRequest) -> Result<&PlatformPorts> {
        let destination = request.direction.destination;
        self.ports.get(destination).ok_or_else(|| {
            Error::InvalidRequest(format!("no ports registered for {}", destination))
        })
    }

    /// Replicate the request's playlist on the destination platform
    ///
    /// A destination playlist with fewer tracks than the source is a
    /// valid outcome. Nothing is rolled back on failure or cancellation.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransferResult> {
        request.validate()?;
        let ports = self.ports_for(request)?;
        let start = Instant::now();

        tracing::info!(
            "Starting transfer: {} ({} tracks) into \"{}\"",
            request.direction,
            request.len(),
            request.title
        );

        self.check_cancelled()?;
        self.report_progress(TransferProgress {
            current: 0,
            total: 1,
            current_name: request.title.clone(),
            phase: TransferPhase::Creating,
            ..Default::default()
        });

        let playlist_id = self.open_playlist(ports, request).await?;

        let mut outcomes = self.match_all(ports, request, start).await?;
        self.write_matches(ports, request, &playlist_id, &mut outcomes, start)
            .await?;

        let result = TransferResult::new(
            playlist_id,
            request.title.clone(),
            request.direction,
            outcomes,
        );

        self.report_progress(TransferProgress {
            current: result.total,
            total: result.total,
            current_name: request.title.clone(),
            phase: TransferPhase::Complete,
            elapsed_seconds: start.elapsed().as_secs(),
        });

        tracing::info!(
            "Transfer complete: {}/{} tracks matched into {}",
            result.matched,
            result.total,
            result.playlist_id
        );

        Ok(result)
    }

    /// Match every track without creating or modifying any playlist
    pub async fn dry_run(&self, request: &TransferRequest) -> Result<DryRunResult> {
        request.validate()?;
        let ports = self.ports_for(request)?;
        let start = Instant::now();

        tracing::info!("Starting dry run: {} ({} tracks)", request.direction, request.len());

        let outcomes = self.match_all(ports, request, start).await?;
        let result = DryRunResult::new(request.direction, outcomes);

        tracing::info!(
            "Dry run complete: {}/{} tracks would be matched",
            result.matched,
            result.total
        );

        Ok(result)
    }

    /// Create the destination playlist, or reuse one when configured to
    async fn open_playlist(&self, ports: &PlatformPorts, request: &TransferRequest) -> Result<String> {
        let platform = request.direction.destination;
        let title = request.title.as_str();
        let writer = &ports.writer;
        let limiter = ports.limiter.as_deref();
        let retry = &self.config.retry;
        let timeout = self.config.transfer.call_timeout();

        if self.config.transfer.reuse_existing_playlist {
            let lookup = with_retry(retry, timeout, limiter, "find playlist", move || {
                writer.find_playlist(title, platform)
            })
            .await;

            match lookup {
                Ok(Some(id)) => {
                    tracing::info!("Reusing existing playlist \"{}\" ({})", title, id);
                    return Ok(id);
                }
                Ok(None) => {}
                Err(PortError::AuthExpired) => return Err(Error::AuthExpired { platform }),
                Err(e) => {
                    tracing::warn!("Playlist lookup failed, creating a new one: {}", e);
                }
            }
        }

        let created = with_retry(retry, timeout, limiter, "create playlist", move || {
            writer.create_playlist(title, platform)
        })
        .await;

        match created {
            Ok(id) => {
                tracing::info!("Created playlist \"{}\" on {} ({})", title, platform, id);
                Ok(id)
            }
            Err(PortError::AuthExpired) => {
                tracing::error!("Cannot create playlist on {}: authentication expired", platform);
                Err(Error::AuthExpired { platform })
            }
            Err(e) => {
                tracing::error!("Cannot create playlist on {}: {}", platform, e);
                Err(Error::DestinationUnavailable {
                    platform,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Run one matcher task per source track, at most `concurrency` at a time
    ///
    /// Results are slotted by source index, so completion order does not
    /// affect the returned order.
    async fn match_all(
        &self,
        ports: &PlatformPorts,
        request: &TransferRequest,
        start: Instant,
    ) -> Result<Vec<MatchResult>> {
        let total = request.len();
        let mut matcher = TrackMatcher::new(ports.search.clone(), request.direction.destination)
            .with_config(self.config.matching.clone())
            .with_retry(self.config.retry)
            .with_call_timeout(self.config.transfer.call_timeout());
        if let Some(limiter) = &ports.limiter {
            matcher = matcher.with_limiter(Arc::clone(limiter));
        }
        let matcher = Arc::new(matcher);
        let semaphore = Arc::new(Semaphore::new(self.config.transfer.concurrency.max(1)));

        self.report_progress(TransferProgress {
            current: 0,
            total,
            current_name: "Searching destination catalog...".to_string(),
            phase: TransferPhase::Matching,
            elapsed_seconds: start.elapsed().as_secs(),
        });

        let mut tasks = JoinSet::new();
        for (index, track) in request.tracks.iter().enumerate() {
            let matcher = Arc::clone(&matcher);
            let semaphore = Arc::clone(&semaphore);
            let track = track.clone();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| Error::Cancelled)?;
                matcher.match_track(index, &track).await
            });
        }

        let mut slots: Vec<Option<MatchResult>> = vec![None; total];
        let mut completed = 0usize;

        loop {
            let joined = tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => {
                    tasks.abort_all();
                    tracing::info!("Transfer cancelled by user at item {}/{}", completed, total);
                    return Err(Error::Cancelled);
                }
                joined = tasks.join_next() => joined,
            };

            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok(Ok(result)) => {
                    completed += 1;
                    self.report_progress(TransferProgress {
                        current: completed,
                        total,
                        current_name: result.source.display_name(),
                        phase: TransferPhase::Matching,
                        elapsed_seconds: start.elapsed().as_secs(),
                    });
                    let index = result.index;
                    slots[index] = Some(result);
                }
                Ok(Err(err)) => {
                    tasks.abort_all();
                    tracing::error!("Matching aborted: {}", err);
                    return Err(err);
                }
                Err(join_err) if join_err.is_panic() => {
                    tasks.abort_all();
                    std::panic::resume_unwind(join_err.into_panic());
                }
                Err(_) => {}
            }
        }

        Ok(slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    MatchResult::new(
                        index,
                        request.tracks[index].clone(),
                        MatchOutcome::unmatched(UnmatchedReason::SearchFailed {
                            error: "match task did not complete".to_string(),
                        }),
                    )
                })
            })
            .collect())
    }

    /// Append matched tracks in source order, chunked to the platform's batch limit
    ///
    /// A chunk that still fails after retries downgrades its tracks to
    /// `WriteFailed`; later chunks are still attempted.
    async fn write_matches(
        &self,
        ports: &PlatformPorts,
        request: &TransferRequest,
        playlist_id: &str,
        outcomes: &mut [MatchResult],
        start: Instant,
    ) -> Result<()> {
        let platform = request.direction.destination;
        let pending: Vec<(usize, String)> = outcomes
            .iter()
            .filter_map(|r| {
                r.outcome
                    .candidate()
                    .map(|c| (r.index, c.destination_id.clone()))
            })
            .collect();

        if pending.is_empty() {
            tracing::info!("No matched tracks to add");
            return Ok(());
        }

        let batch_size = ports.writer.max_batch_size(platform).max(1);
        let writer = &ports.writer;
        let limiter = ports.limiter.as_deref();
        let retry = &self.config.retry;
        let timeout = self.config.transfer.call_timeout();
        let mut written = 0usize;

        for chunk in pending.chunks(batch_size) {
            self.check_cancelled()?;

            let ids: Vec<String> = chunk.iter().map(|(_, id)| id.clone()).collect();
            let ids = ids.as_slice();

            let appended = tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => return Err(Error::Cancelled),
                appended = with_retry(retry, timeout, limiter, "append tracks", move || {
                    writer.append_tracks(playlist_id, ids)
                }) => appended,
            };

            match appended {
                Ok(()) => {
                    written += chunk.len();
                }
                Err(PortError::AuthExpired) => {
                    tracing::error!("Cannot add tracks on {}: authentication expired", platform);
                    return Err(Error::AuthExpired { platform });
                }
                Err(e) => {
                    let message = e.to_string();
                    tracing::error!(
                        "Failed to add {} track(s) starting at #{}: {}",
                        chunk.len(),
                        chunk[0].0 + 1,
                        message
                    );
                    for (index, _) in chunk {
                        outcomes[*index].downgrade_to_write_failed(&message);
                    }
                }
            }

            self.report_progress(TransferProgress {
                current: written,
                total: pending.len(),
                current_name: request.title.clone(),
                phase: TransferPhase::Writing,
                elapsed_seconds: start.elapsed().as_secs(),
            });
        }

        Ok(())
    }
}

/// Builder for creating a TransferEngine
pub struct TransferEngineBuilder {
    ports: PortRegistry,
    config: Option<Config>,
    progress_callback: Option<ProgressCallback>,
    cancellation: Option<CancellationToken>,
    rate_limited: bool,
}

impl TransferEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            ports: PortRegistry::new(),
            config: None,
            progress_callback: None,
            cancellation: None,
            rate_limited: false,
        }
    }

    /// Set the port registry
    pub fn ports(mut self, ports: PortRegistry) -> Self {
        self.ports = ports;
        self
    }

    /// Set the configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the progress callback
    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Set the cancellation token
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Give each platform's ports the configured request quota
    pub fn rate_limited(mut self) -> Self {
        self.rate_limited = true;
        self
    }

    /// Build the TransferEngine
    pub fn build(self) -> Result<TransferEngine> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        if self.ports.platforms().next().is_none() {
            return Err(Error::Config("no platform ports registered".to_string()));
        }

        let ports = if self.rate_limited {
            self.ports.throttled(&config.rate_limit)
        } else {
            self.ports
        };

        let mut engine = TransferEngine::new(ports).with_config(config);
        if let Some(callback) = self.progress_callback {
            engine = engine.with_progress_callback(callback);
        }
        if let Some(token) = self.cancellation {
            engine = engine.with_cancellation(token);
        }

        Ok(engine)
    }
}

impl Default for TransferEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
