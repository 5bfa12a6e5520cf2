//! Reading source playlists from disk
//!
//! A source file is a JSON array. Each entry is either a full track or a
//! raw video item whose title still has to be split into artist and title:
//!
//! ```json
//! [
//!   { "platform": "spotify", "id": "4uLU6h", "title": "Yesterday", "artists": ["The Beatles"], "duration_ms": 125000 },
//!   { "id": "dQw4w9WgXcQ", "video_title": "Rick Astley - Never Gonna Give You Up (Official Video)" }
//! ]
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use playlist_bridge_core::{Platform, Track};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SourceEntry {
    Video {
        id: String,
        video_title: String,
        #[serde(default)]
        duration_ms: Option<u64>,
    },
    Track(Track),
}

/// Load the source playlist at `path`
pub fn load_tracks(path: &Path, source: Platform) -> anyhow::Result<Vec<Track>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read source playlist {}", path.display()))?;
    let tracks = parse_tracks(&content, source)
        .with_context(|| format!("Invalid source playlist {}", path.display()))?;

    tracing::info!("Loaded {} source tracks from {}", tracks.len(), path.display());
    Ok(tracks)
}

/// Parse a source playlist, keeping entry order
pub fn parse_tracks(content: &str, source: Platform) -> anyhow::Result<Vec<Track>> {
    let entries: Vec<SourceEntry> = serde_json::from_str(content)?;

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| match entry {
            SourceEntry::Video {
                id,
                video_title,
                duration_ms,
            } => Ok(Track::from_video_title(
                source,
                id,
                &video_title,
                duration_ms.map(Duration::from_millis),
            )),
            SourceEntry::Track(track) if track.platform() == source => Ok(track),
            SourceEntry::Track(track) => Err(anyhow::anyhow!(
                "entry #{} is a {} track, expected {}",
                i + 1,
                track.platform(),
                source
            )),
        })
        .collect()
}
