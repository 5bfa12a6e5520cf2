//! Splitting raw video titles into artist and song title

use std::time::Duration;

use crate::matching::strip_bracketed;
use crate::track::{Platform, Track};

/// Separators commonly placed between artist and song in video titles
const SEPARATORS: [&str; 5] = [" - ", " – ", " — ", " | ", " : "];

/// Artist and title recovered from a free-form video title
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedTitle {
    /// Empty when the title carried no separator
    pub artist: String,
    pub title: String,
}

/// Parse a video title such as `"Daft Punk - One More Time (Official Video)"`
///
/// Bracketed segments are dropped first. The first separator found (in
/// [`SEPARATORS`] order) splits artist from title; anything after a
/// further separator is discarded.
pub fn parse_video_title(raw: &str) -> ParsedTitle {
    let cleaned = strip_bracketed(raw);
    let cleaned = cleaned.trim();

    for sep in SEPARATORS {
        if let Some((artist, rest)) = cleaned.split_once(sep) {
            let title = SEPARATORS
                .iter()
                .filter_map(|s| rest.find(s))
                .min()
                .map_or(rest, |end| &rest[..end]);
            return ParsedTitle {
                artist: collapse(artist),
                title: collapse(title),
            };
        }
    }

    ParsedTitle {
        artist: String::new(),
        title: collapse(cleaned),
    }
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl Track {
    /// Build a track from a raw video title, splitting out the artist
    pub fn from_video_title(
        platform: Platform,
        id: impl Into<String>,
        raw_title: &str,
        duration: Option<Duration>,
    ) -> Self {
        let parsed = parse_video_title(raw_title);
        let artists = if parsed.artist.is_empty() {
            Vec::new()
        } else {
            vec![parsed.artist]
        };

        let track = Track::new(platform, id, parsed.title, artists);
        match duration {
            Some(d) => track.with_duration(d),
            None => track,
        }
    }
}
