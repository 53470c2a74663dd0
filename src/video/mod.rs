//! Video platform integration: candidate search, ranking, and stream download.
//!
//! # Architecture
//!
//! - **Ranking** (`ranking.rs`) - the official > remaster > first-hit policy
//! - **yt-dlp** (`ytdlp/`) - search via `ytsearchN:` and stream downloads
//! - **YouTube Data API** (`youtube_api/`) - optional richer search backend
//!
//! Both search backends produce [`VideoCandidate`]s through their own
//! adapters, so the ranking policy never sees backend-specific JSON.

pub mod ranking;
pub mod youtube_api;
pub mod ytdlp;

pub use ranking::pick_candidate;
pub use youtube_api::YouTubeApiClient;
pub use ytdlp::YtDlp;

use crate::model::{Track, VideoCandidate};
use crate::tools::ToolError;
use crate::traits::VideoSearch;

/// Errors from the video backends
#[derive(Debug, Clone, thiserror::Error)]
pub enum VideoError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Quota exceeded or rate limited")]
    RateLimited,
}

/// Resolve a track to the single best video candidate.
///
/// Backend failures are logged and mapped to `None` so one track's search
/// failure cannot abort the poll cycle.
pub async fn resolve_candidate(
    search: &dyn VideoSearch,
    track: &Track,
    limit: usize,
) -> Option<VideoCandidate> {
    let query = track.search_query();

    match search.search(&query, limit).await {
        Ok(candidates) => {
            tracing::debug!("{} candidates for {:?}", candidates.len(), query);
            pick_candidate(candidates)
        }
        Err(e) => {
            tracing::error!("Video search failed for {:?}: {}", query, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::mocks::MockVideoSearch;

    #[tokio::test]
    async fn test_resolve_picks_official() {
        let search = MockVideoSearch::with_titles(&["X Remaster", "Y Official Video", "Z"]);
        let track = Track::new("Air", "Sexy Boy", "", 1);

        let picked = resolve_candidate(&search, &track, 10).await.unwrap();
        assert_eq!(picked.title, "Y Official Video");
        assert_eq!(search.queries(), vec!["Air Sexy Boy".to_string()]);
    }

    #[tokio::test]
    async fn test_resolve_backend_failure_is_none() {
        let search = MockVideoSearch::with_error(VideoError::Network("offline".to_string()));
        let track = Track::new("Air", "Sexy Boy", "", 1);

        assert!(resolve_candidate(&search, &track, 10).await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_empty_results_is_none() {
        let search = MockVideoSearch::with_titles(&[]);
        let track = Track::new("Air", "Sexy Boy", "", 1);

        assert!(resolve_candidate(&search, &track, 10).await.is_none());
    }
}
