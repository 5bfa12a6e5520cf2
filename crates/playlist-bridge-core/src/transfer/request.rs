//! Transfer job input

use crate::error::{Error, Result};
use crate::track::{Platform, Track};
use crate::transfer::direction::TransferDirection;

/// One playlist to replicate on the destination platform
///
/// Track order is the playlist order and is kept end to end.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub tracks: Vec<Track>,
    pub direction: TransferDirection,
    /// Title of the playlist created on the destination
    pub title: String,
}

impl TransferRequest {
    /// Build a request, defaulting a missing or blank title to
    /// `"Transferred from <source>"`
    pub fn new(tracks: Vec<Track>, direction: TransferDirection, title: Option<String>) -> Self {
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| Self::default_title(direction.source));

        Self {
            tracks,
            direction,
            title,
        }
    }

    pub fn default_title(source: Platform) -> String {
        format!("Transferred from {}", source)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Check the request can be run
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidRequest(
                "destination playlist title must not be empty".to_string(),
            ));
        }
        if !self.direction.is_cross_platform() {
            return Err(Error::InvalidRequest(format!(
                "source and destination are both {}",
                self.direction.source
            )));
        }
        Ok(())
    }
}
