//! Track and platform types

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A music-streaming platform that playlists can be moved between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Spotify,
    #[serde(rename = "youtube")]
    YouTube,
}

impl Platform {
    /// All supported platforms
    pub const ALL: [Platform; 2] = [Platform::Spotify, Platform::YouTube];

    /// Lowercase identifier used in config files and CLI arguments
    pub fn id(&self) -> &'static str {
        match self {
            Self::Spotify => "spotify",
            Self::YouTube => "youtube",
        }
    }

    /// Maximum number of tracks one append call accepts on this platform
    ///
    /// Spotify takes up to 100 items per request, YouTube inserts one
    /// playlist item per request.
    pub fn append_batch_limit(&self) -> usize {
        match self {
            Self::Spotify => 100,
            Self::YouTube => 1,
        }
    }

    /// Words appended to the first catalog query on this platform
    pub fn search_suffix(&self) -> Option<&'static str> {
        match self {
            Self::Spotify => None,
            Self::YouTube => Some("official audio"),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spotify => write!(f, "Spotify"),
            Self::YouTube => write!(f, "YouTube"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spotify" | "sp" => Ok(Self::Spotify),
            "youtube" | "yt" => Ok(Self::YouTube),
            other => Err(format!(
                "Unknown platform '{}'. Use: {}",
                other,
                Self::ALL.map(|p| p.id()).join(" or ")
            )),
        }
    }
}

/// A single song as listed on its platform of origin
///
/// Tracks are immutable once constructed; use the `with_*` methods while
/// building one up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    platform: Platform,
    id: String,
    title: String,
    #[serde(default)]
    artists: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
}

impl Track {
    /// Create a track with the required identity fields
    pub fn new(
        platform: Platform,
        id: impl Into<String>,
        title: impl Into<String>,
        artists: Vec<String>,
    ) -> Self {
        Self {
            platform,
            id: id.into(),
            title: title.into(),
            artists,
            album: None,
            duration_ms: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(duration.as_millis() as u64);
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Opaque id of the track on its own platform
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artists(&self) -> &[String] {
        &self.artists
    }

    /// First credited artist, used when building search queries
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists
            .iter()
            .map(|a| a.trim())
            .find(|a| !a.is_empty())
    }

    pub fn album(&self) -> Option<&str> {
        self.album.as_deref()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }

    /// "Artist - Title" label for logs and progress output
    pub fn display_name(&self) -> String {
        match self.primary_artist() {
            Some(artist) => format!("{} - {}", artist, self.title),
            None => self.title.clone(),
        }
    }
}

/// A track found by a destination-platform search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateTrack {
    /// Id the track would be appended under on the destination platform
    pub destination_id: String,
    /// Metadata as reported by the destination catalog
    pub track: Track,
}

impl CandidateTrack {
    pub fn new(destination_id: impl Into<String>, track: Track) -> Self {
        Self {
            destination_id: destination_id.into(),
            track,
        }
    }

    /// Build a candidate whose destination id is the catalog track's own id
    pub fn from_track(track: Track) -> Self {
        Self {
            destination_id: track.id().to_string(),
            track,
        }
    }
}
