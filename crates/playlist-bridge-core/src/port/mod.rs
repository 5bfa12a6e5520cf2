//! Interfaces to the streaming platforms
//!
//! The engine never talks to a platform directly. It goes through a
//! [`CatalogSearch`] / [`PlaylistWrite`] capability pair registered per
//! destination [`Platform`] in a [`PortRegistry`], so both transfer
//! directions share one code path.

mod local;
mod rate_limit;

pub use local::{CatalogFile, LocalCatalog, LocalPlaylist};
pub use rate_limit::{RateLimiter, MIN_CALLS_PER_SECOND};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::RateLimitConfig;
use crate::error::PortError;
use crate::track::{CandidateTrack, Platform};

/// Read-only search against a platform's catalog
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Return at most `limit` candidates for `query`, best first as ranked
    /// by the platform
    async fn search(
        &self,
        query: &str,
        platform: Platform,
        limit: usize,
    ) -> Result<Vec<CandidateTrack>, PortError>;
}

/// Playlist creation and population on a platform
#[async_trait]
pub trait PlaylistWrite: Send + Sync {
    /// Create an empty playlist and return its id
    async fn create_playlist(&self, title: &str, platform: Platform) -> Result<String, PortError>;

    /// Append tracks to the end of a playlist, keeping the given order
    async fn append_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<(), PortError>;

    /// Look up an existing playlist by exact title
    async fn find_playlist(
        &self,
        _title: &str,
        _platform: Platform,
    ) -> Result<Option<String>, PortError> {
        Ok(None)
    }

    /// Largest number of ids a single [`append_tracks`](Self::append_tracks) call accepts
    fn max_batch_size(&self, platform: Platform) -> usize {
        platform.append_batch_limit()
    }
}

/// Search and write capabilities for one destination platform
///
/// When `limiter` is set, every call to either port first takes a slot
/// from it. Search and write share the one quota.
#[derive(Clone)]
pub struct PlatformPorts {
    pub search: Arc<dyn CatalogSearch>,
    pub writer: Arc<dyn PlaylistWrite>,
    pub limiter: Option<Arc<RateLimiter>>,
}

impl PlatformPorts {
    pub fn new(search: Arc<dyn CatalogSearch>, writer: Arc<dyn PlaylistWrite>) -> Self {
        Self {
            search,
            writer,
            limiter: None,
        }
    }

    /// Use one adapter for both capabilities
    pub fn from_adapter<A>(adapter: Arc<A>) -> Self
    where
        A: CatalogSearch + PlaylistWrite + 'static,
    {
        Self::new(adapter.clone(), adapter)
    }

    pub fn with_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }
}

/// Capability pairs keyed by destination platform
#[derive(Clone, Default)]
pub struct PortRegistry {
    ports: HashMap<Platform, PlatformPorts>,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the ports used when `platform` is the destination
    pub fn register(mut self, platform: Platform, ports: PlatformPorts) -> Self {
        self.ports.insert(platform, ports);
        self
    }

    pub fn get(&self, platform: Platform) -> Option<&PlatformPorts> {
        self.ports.get(&platform)
    }

    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.ports.keys().copied()
    }

    /// Give every registered pair its own quota from `config`
    pub fn throttled(self, config: &RateLimitConfig) -> Self {
        let ports = self
            .ports
            .into_iter()
            .map(|(platform, ports)| {
                let limiter = Arc::new(RateLimiter::from_config(config));
                (platform, ports.with_limiter(limiter))
            })
            .collect();

        Self { ports }
    }
}

impl std::fmt::Debug for PortRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortRegistry")
            .field("platforms", &self.ports.keys().collect::<Vec<_>>())
            .finish()
    }
}
