//! Transfer direction types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::track::Platform;

/// Source and destination platform of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferDirection {
    pub source: Platform,
    pub destination: Platform,
}

impl TransferDirection {
    pub const SPOTIFY_TO_YOUTUBE: Self = Self::new(Platform::Spotify, Platform::YouTube);
    pub const YOUTUBE_TO_SPOTIFY: Self = Self::new(Platform::YouTube, Platform::Spotify);

    pub const fn new(source: Platform, destination: Platform) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// The same pair of platforms, the other way round
    pub fn reversed(&self) -> Self {
        Self::new(self.destination, self.source)
    }

    /// A direction is usable only between two different platforms
    pub fn is_cross_platform(&self) -> bool {
        self.source != self.destination
    }

    /// Identifier such as `spotify-to-youtube`
    pub fn short_name(&self) -> String {
        format!("{}-to-{}", self.source.id(), self.destination.id())
    }
}

impl Default for TransferDirection {
    fn default() -> Self {
        Self::SPOTIFY_TO_YOUTUBE
    }
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source.id(), self.destination.id())
    }
}

impl FromStr for TransferDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "s2y" | "sp2yt" => return Ok(Self::SPOTIFY_TO_YOUTUBE),
            "y2s" | "yt2sp" => return Ok(Self::YOUTUBE_TO_SPOTIFY),
            _ => {}
        }

        let (source, destination) = lower.split_once("-to-").ok_or_else(|| {
            format!(
                "Invalid direction '{}'. Use: spotify-to-youtube (s2y) or youtube-to-spotify (y2s)",
                s
            )
        })?;
        Ok(Self::new(source.parse()?, destination.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(TransferDirection::SPOTIFY_TO_YOUTUBE.to_string(), "spotify -> youtube");
        assert_eq!(TransferDirection::YOUTUBE_TO_SPOTIFY.to_string(), "youtube -> spotify");
    }

    #[test]
    fn test_reversed() {
        assert_eq!(
            TransferDirection::SPOTIFY_TO_YOUTUBE.reversed(),
            TransferDirection::YOUTUBE_TO_SPOTIFY
        );
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!(
            "spotify-to-youtube".parse::<TransferDirection>(),
            Ok(TransferDirection::SPOTIFY_TO_YOUTUBE)
        );
        assert_eq!(
            "y2s".parse::<TransferDirection>(),
            Ok(TransferDirection::YOUTUBE_TO_SPOTIFY)
        );
        assert_eq!(
            "yt-to-sp".parse::<TransferDirection>(),
            Ok(TransferDirection::YOUTUBE_TO_SPOTIFY)
        );
        assert!("sideways".parse::<TransferDirection>().is_err());
        assert!("spotify-to-tidal".parse::<TransferDirection>().is_err());
    }

    #[test]
    fn test_cross_platform() {
        assert!(TransferDirection::SPOTIFY_TO_YOUTUBE.is_cross_platform());
        assert!(!TransferDirection::new(Platform::Spotify, Platform::Spotify).is_cross_platform());
        assert_eq!(
            TransferDirection::SPOTIFY_TO_YOUTUBE.short_name(),
            "spotify-to-youtube"
        );
    }
}
