//! Last.fm web API integration: the scrobble feed and the tag lookup.
//!
//! API docs: https://www.last.fm/api
//!
//! - `user.getRecentTracks` feeds [`crate::traits::ScrobbleFeed`]
//! - `track.getInfo` feeds [`crate::traits::TrackInfoApi`]
//!
//! Responses are deserialized into [`dto`] types and converted to domain
//! types in `adapter`; nothing outside this module sees Last.fm JSON.

mod adapter;
mod client;
pub mod dto;

pub use adapter::{to_track_info, to_tracks};
pub use client::LastFmClient;

use crate::model::Track;
use crate::traits::TrackInfoApi;

/// Descriptive data for a track from `track.getInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackInfo {
    /// Top tags, most popular first
    pub tags: Vec<String>,
    /// Album title, when Last.fm knows one
    pub album: Option<String>,
}

/// Errors from the Last.fm API
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Not found")]
    NotFound,
}

/// Look up descriptive tags for a track.
///
/// Never fails: a lookup error is logged and yields empty info so tagging
/// can proceed with an empty genre.
pub async fn resolve_metadata(api: &dyn TrackInfoApi, track: &Track) -> TrackInfo {
    match api.track_info(&track.artist, &track.title).await {
        Ok(info) => {
            tracing::debug!("Tags for {}: {:?}", track, info.tags);
            info
        }
        Err(FeedError::NotFound) => {
            tracing::info!("No Last.fm metadata for {}", track);
            TrackInfo::default()
        }
        Err(e) => {
            tracing::warn!(
                "{}",
                crate::error::Error::MetadataLookupFailed(format!("{}: {}", track, e))
            );
            TrackInfo::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::mocks::MockTrackInfo;

    #[tokio::test]
    async fn test_resolve_metadata_returns_tags() {
        let api = MockTrackInfo::with_tags(&["electronic"]);
        let track = Track::new("Air", "La Femme D'Argent", "", 1000);

        let info = resolve_metadata(&api, &track).await;
        assert_eq!(info.tags, vec!["electronic".to_string()]);
    }

    #[tokio::test]
    async fn test_resolve_metadata_failure_is_empty() {
        let api = MockTrackInfo::with_error(FeedError::Network("timeout".to_string()));
        let track = Track::new("Air", "La Femme D'Argent", "", 1000);

        let info = resolve_metadata(&api, &track).await;
        assert_eq!(info, TrackInfo::default());
    }
}
