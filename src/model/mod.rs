//! Core data models for the poller.
//!
//! Defines the entities that flow through a poll cycle: [`Track`] (a play
//! observed on the scrobble feed), [`Watermark`] (the persisted progress
//! marker), [`VideoCandidate`] (a search hit on the video platform) and
//! [`MediaTags`] (what gets written into the output container).
//!
//! All external API responses are converted into these types at the
//! client boundary; nothing past the adapters sees raw JSON.

use std::fmt;
use std::path::{Path, PathBuf};

/// Separator between artist and title in canonical file names.
///
/// Previously produced libraries rely on this exact byte sequence.
pub const NAME_SEPARATOR: &str = " - ";

/// A play event from the scrobble feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Artist name as reported by the feed
    pub artist: String,
    /// Track title as reported by the feed
    pub title: String,
    /// Album title (empty when the feed has none)
    pub album: String,
    /// Unix timestamp (seconds) of the play
    pub played_at: i64,
}

impl Track {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        album: impl Into<String>,
        played_at: i64,
    ) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            album: album.into(),
            played_at,
        }
    }

    /// Filesystem-safe `"<artist> - <title>"` stem used for every per-track file.
    pub fn canonical_stem(&self) -> String {
        format!(
            "{}{}{}",
            sanitize_filename(&self.artist),
            NAME_SEPARATOR,
            sanitize_filename(&self.title)
        )
    }

    /// Canonical output file name, e.g. `Air - La Femme D'Argent.mp4`.
    pub fn canonical_file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.canonical_stem(), extension)
    }

    /// Canonical output path under `output_dir`. This is the dedup key.
    pub fn canonical_path(&self, output_dir: &Path, extension: &str) -> PathBuf {
        output_dir.join(self.canonical_file_name(extension))
    }

    /// Search query sent to the video backend.
    pub fn search_query(&self) -> String {
        format!("{} {}", self.artist, self.title)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.title, self.artist)
    }
}

/// Latest confirmed `played_at` (Unix seconds).
///
/// Monotonically non-decreasing: [`Watermark::advance_to`] never moves it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Watermark(pub i64);

impl Watermark {
    pub fn value(self) -> i64 {
        self.0
    }

    /// Returns the later of the two watermarks.
    pub fn advance_to(self, played_at: i64) -> Self {
        Watermark(self.0.max(played_at))
    }

    /// Whether a play at `played_at` is already covered by this watermark.
    pub fn covers(self, played_at: i64) -> bool {
        played_at <= self.0
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match chrono::DateTime::from_timestamp(self.0, 0) {
            Some(ts) => write!(f, "{} ({})", self.0, ts.to_rfc3339()),
            None => write!(f, "{}", self.0),
        }
    }
}

/// A video search hit. Ephemeral: produced and consumed within one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoCandidate {
    /// Playable watch URL
    pub url: String,
    /// Video title
    pub title: String,
    /// Video description, when the backend returns one
    pub description: Option<String>,
    /// Best available thumbnail URL
    pub thumbnail_url: Option<String>,
}

impl VideoCandidate {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Metadata written into the output container.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Descriptive tags; joined into the genre field
    pub genres: Vec<String>,
}

impl MediaTags {
    /// Build tags for a track, preferring the feed album and falling back to `album_hint`.
    pub fn for_track(track: &Track, genres: Vec<String>, album_hint: Option<&str>) -> Self {
        let album = if track.album.trim().is_empty() {
            album_hint.unwrap_or_default().to_string()
        } else {
            track.album.clone()
        };

        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album,
            genres,
        }
    }

    /// Genre field value (empty string when there are no tags).
    pub fn genre(&self) -> String {
        self.genres.join("; ")
    }
}

/// Replaces characters that are invalid in file names on common filesystems.
pub fn sanitize_filename(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect()
}
