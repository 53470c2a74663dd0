//! Adapter layer: Convert Last.fm DTOs to domain models
//!
//! This is the ONLY place where Last.fm DTO types are converted to domain types.

use super::{TrackInfo, dto};
use crate::model::Track;

/// Convert one page of recent tracks to domain tracks, newest first (API order).
///
/// Drops the now-playing entry (no timestamp yet) and entries missing an
/// artist, a title, or a parseable timestamp.
pub fn to_tracks(response: dto::RecentTracksResponse) -> Vec<Track> {
    response
        .recenttracks
        .track
        .into_vec()
        .into_iter()
        .filter_map(convert_track)
        .collect()
}

fn convert_track(entry: dto::RecentTrack) -> Option<Track> {
    if is_now_playing(&entry) {
        return None;
    }

    let played_at = entry.date.as_ref()?.uts.trim().parse::<i64>().ok()?;
    let artist = entry.artist.map(|a| a.text).unwrap_or_default();
    let title = entry.name;

    if artist.trim().is_empty() || title.trim().is_empty() {
        tracing::debug!("Skipping feed entry without artist/title at {}", played_at);
        return None;
    }

    let album = entry.album.map(|a| a.text).unwrap_or_default();

    Some(Track {
        artist,
        title,
        album,
        played_at,
    })
}

fn is_now_playing(entry: &dto::RecentTrack) -> bool {
    entry
        .attr
        .as_ref()
        .and_then(|a| a.nowplaying.as_deref())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Total page count advertised by a feed page (0 when absent or unparseable).
pub fn total_pages(response: &dto::RecentTracksResponse) -> u32 {
    response
        .recenttracks
        .attr
        .as_ref()
        .and_then(|a| a.total_pages.trim().parse().ok())
        .unwrap_or(0)
}

/// Convert a `track.getInfo` response, keeping at most `max_tags` tags.
pub fn to_track_info(response: dto::TrackInfoResponse, max_tags: usize) -> TrackInfo {
    let tags = response
        .track
        .toptags
        .map(|t| t.tag.into_vec())
        .unwrap_or_default()
        .into_iter()
        .map(|t| t.name.trim().to_string())
        .filter(|name| !name.is_empty())
        .take(max_tags)
        .collect();

    let album = response
        .track
        .album
        .map(|a| a.title)
        .filter(|t| !t.trim().is_empty());

    TrackInfo { tags, album }
}
