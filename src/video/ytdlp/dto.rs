//! yt-dlp JSON output types
//!
//! Shape of `yt-dlp --dump-single-json --flat-playlist "ytsearchN:<query>"`.
//! Flat entries carry far fewer fields than a full extraction; everything
//! except `id` is optional.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchPlaylist {
    #[serde(default)]
    pub entries: Vec<SearchEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchEntry {
    pub id: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Single best thumbnail (full extraction only)
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}
