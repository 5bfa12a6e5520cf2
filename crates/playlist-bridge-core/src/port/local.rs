//! Offline catalog adapter backed by a JSON file
//!
//! Serves a fixed list of tracks as one platform's catalog and keeps
//! created playlists in memory. Used by the CLI and for trying out
//! matching settings without platform credentials.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{PortError, Result};
use crate::matching::normalize_name;
use crate::port::{CatalogSearch, PlaylistWrite};
use crate::track::{CandidateTrack, Platform};

/// On-disk catalog format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub platform: Platform,
    pub tracks: Vec<CandidateTrack>,
}

/// A playlist created through a [`LocalCatalog`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPlaylist {
    pub id: String,
    pub title: String,
    pub platform: Platform,
    pub track_ids: Vec<String>,
}

/// In-memory catalog for a single platform
pub struct LocalCatalog {
    platform: Platform,
    tracks: Vec<CandidateTrack>,
    /// Normalized "title artists" text per track, same order as `tracks`
    search_text: Vec<String>,
    playlists: Mutex<Vec<LocalPlaylist>>,
}

impl LocalCatalog {
    pub fn new(platform: Platform, tracks: Vec<CandidateTrack>) -> Self {
        let search_text = tracks
            .iter()
            .map(|c| {
                let mut text = c.track.title().to_string();
                for artist in c.track.artists() {
                    text.push(' ');
                    text.push_str(artist);
                }
                normalize_name(&text)
            })
            .collect();

        Self {
            platform,
            tracks,
            search_text,
            playlists: Mutex::new(Vec::new()),
        }
    }

    /// Load a catalog from a JSON [`CatalogFile`]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&content)?;
        tracing::info!(
            "Loaded {} catalog entries for {} from {}",
            file.tracks.len(),
            file.platform,
            path.display()
        );
        Ok(Self::new(file.platform, file.tracks))
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Snapshot of every playlist created so far
    pub fn playlists(&self) -> Vec<LocalPlaylist> {
        self.lock_playlists().clone()
    }

    pub fn playlist(&self, id: &str) -> Option<LocalPlaylist> {
        self.lock_playlists().iter().find(|p| p.id == id).cloned()
    }

    /// Write all created playlists to `path` as pretty JSON
    pub fn save_playlists(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.playlists())?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn lock_playlists(&self) -> std::sync::MutexGuard<'_, Vec<LocalPlaylist>> {
        self.playlists.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_platform(&self, platform: Platform) -> std::result::Result<(), PortError> {
        if platform == self.platform {
            Ok(())
        } else {
            Err(PortError::Unavailable(format!(
                "local catalog serves {}, not {}",
                self.platform, platform
            )))
        }
    }
}

#[async_trait]
impl CatalogSearch for LocalCatalog {
    async fn search(
        &self,
        query: &str,
        platform: Platform,
        limit: usize,
    ) -> std::result::Result<Vec<CandidateTrack>, PortError> {
        self.check_platform(platform)?;

        let query = normalize_name(query);
        let query_tokens: Vec<&str> = query.split_whitespace().collect();
        if query_tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<(usize, usize)> = self
            .search_text
            .iter()
            .enumerate()
            .filter_map(|(idx, text)| {
                let words: Vec<&str> = text.split_whitespace().collect();
                let hits = query_tokens.iter().filter(|t| words.contains(t)).count();
                (hits > 0).then_some((idx, hits))
            })
            .collect();

        // Stable sort keeps catalog order between equal hit counts
        hits.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(hits
            .into_iter()
            .take(limit)
            .map(|(idx, _)| self.tracks[idx].clone())
            .collect())
    }
}

#[async_trait]
impl PlaylistWrite for LocalCatalog {
    async fn create_playlist(
        &self,
        title: &str,
        platform: Platform,
    ) -> std::result::Result<String, PortError> {
        self.check_platform(platform)?;

        let mut playlists = self.lock_playlists();
        let id = format!("{}-playlist-{}", platform.id(), playlists.len() + 1);
        playlists.push(LocalPlaylist {
            id: id.clone(),
            title: title.to_string(),
            platform,
            track_ids: Vec::new(),
        });
        Ok(id)
    }

    async fn append_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> std::result::Result<(), PortError> {
        let mut playlists = self.lock_playlists();
        let playlist = playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| PortError::Unavailable(format!("unknown playlist {}", playlist_id)))?;
        playlist.track_ids.extend_from_slice(track_ids);
        Ok(())
    }

    async fn find_playlist(
        &self,
        title: &str,
        platform: Platform,
    ) -> std::result::Result<Option<String>, PortError> {
        self.check_platform(platform)?;
        Ok(self
            .lock_playlists()
            .iter()
            .find(|p| p.title == title)
            .map(|p| p.id.clone()))
    }
}
