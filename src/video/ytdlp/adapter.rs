//! Adapter layer: Convert yt-dlp search output to [`VideoCandidate`]s

use super::dto;
use crate::model::VideoCandidate;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Convert search entries to candidates, preserving backend order.
pub fn to_candidates(playlist: dto::SearchPlaylist) -> Vec<VideoCandidate> {
    playlist
        .entries
        .into_iter()
        .filter_map(convert_entry)
        .collect()
}

fn convert_entry(entry: dto::SearchEntry) -> Option<VideoCandidate> {
    let url = match (entry.url, entry.id) {
        (Some(url), _) if url.starts_with("http") => url,
        (_, Some(id)) if !id.is_empty() => format!("{}{}", WATCH_URL, id),
        _ => return None,
    };

    let thumbnail_url = entry.thumbnail.or_else(|| largest_thumbnail(entry.thumbnails));

    Some(VideoCandidate {
        url,
        title: entry.title.unwrap_or_default(),
        description: entry.description.filter(|d| !d.is_empty()),
        thumbnail_url,
    })
}

fn largest_thumbnail(thumbnails: Vec<dto::Thumbnail>) -> Option<String> {
    thumbnails
        .into_iter()
        .max_by_key(|t| t.width.unwrap_or(0) as u64 * t.height.unwrap_or(0) as u64)
        .map(|t| t.url)
}
