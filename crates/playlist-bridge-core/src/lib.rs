//! # playlist-bridge-core
//!
//! Core library for moving playlists between music-streaming platforms.
//!
//! Platforms share no stable track identifier, so every source track is
//! searched for on the destination, candidates are scored, and the best
//! match is appended to a new playlist in the original order.
//!
//! ## Modules
//!
//! - [`track`] - Track, candidate and platform types, video-title parsing
//! - [`matching`] - Title normalization, similarity scoring and per-track matching
//! - [`port`] - Catalog search / playlist write interfaces, rate limiting, offline catalog
//! - [`transfer`] - Transfer requests, results and the orchestrating engine
//! - [`config`] - Configuration loading and validation
//! - [`retry`] - Bounded exponential backoff for port calls
//! - [`error`] - Error types and Result alias
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use playlist_bridge_core::{
//!     LocalCatalog, Platform, PlatformPorts, PortRegistry, TransferDirection, TransferEngine,
//!     TransferRequest,
//! };
//!
//! # async fn run(tracks: Vec<playlist_bridge_core::Track>) -> playlist_bridge_core::Result<()> {
//! let catalog = Arc::new(LocalCatalog::load("youtube.json".as_ref())?);
//! let ports = PortRegistry::new().register(Platform::YouTube, PlatformPorts::from_adapter(catalog));
//!
//! let engine = TransferEngine::builder().ports(ports).build()?;
//! let request = TransferRequest::new(tracks, TransferDirection::SPOTIFY_TO_YOUTUBE, None);
//! let result = engine.transfer(&request).await?;
//! println!("{}/{} tracks matched", result.matched, result.total);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod matching;
pub mod port;
pub mod retry;
pub mod track;
pub mod transfer;

// Error types
pub use error::{Error, PortError, Result};

// Configuration
pub use config::{Config, MatchConfig, RateLimitConfig, TransferConfig};

// Track model
pub use track::{parse_video_title, CandidateTrack, ParsedTitle, Platform, Track};

// Matching
pub use matching::{
    score, MatchOutcome, MatchResult, ScoreBreakdown, TrackMatcher, UnmatchedReason,
    DEFAULT_MATCH_THRESHOLD,
};

// Ports
pub use port::{
    CatalogFile, CatalogSearch, LocalCatalog, LocalPlaylist, PlatformPorts, PlaylistWrite,
    PortRegistry, RateLimiter,
};

// Retry
pub use retry::RetryPolicy;

// Transfer engine
pub use transfer::{
    DryRunResult, ProgressCallback, TransferDirection, TransferEngine, TransferEngineBuilder,
    TransferPhase, TransferProgress, TransferRequest, TransferResult,
};
