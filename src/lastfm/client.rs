//! Last.fm HTTP client
//!
//! Handles communication with the Last.fm web service.
//! See: https://www.last.fm/api/show/user.getRecentTracks
//!
//! ## Paging
//!
//! `user.getRecentTracks` pages newest-first. Without a watermark only page 1
//! (the most recent plays) is fetched; the unfiltered page count covers the
//! listener's whole history. When resuming from a watermark and more pages
//! exist than we are willing to fetch in one cycle, we fetch the OLDEST pages
//! so the watermark can advance in order; the newer plays are picked up on
//! the following cycles.

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::{FeedError, TrackInfo, adapter, dto};
use crate::config::LastFmConfig;
use crate::model::{Track, Watermark};

/// Last.fm error code for a missing track/user.
const ERROR_NOT_FOUND: i64 = 6;
/// Last.fm error code for rate limiting.
const ERROR_RATE_LIMIT: i64 = 29;

const DEFAULT_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// Last.fm API client
pub struct LastFmClient {
    api_key: String,
    username: String,
    http_client: reqwest::Client,
    base_url: String,
    page_limit: u32,
    max_pages: u32,
    max_tags: usize,
}

impl LastFmClient {
    /// Create a new client from validated configuration.
    pub fn new(config: &LastFmConfig, timeout: Duration) -> Result<Self, FeedError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| FeedError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key.clone().unwrap_or_default(),
            username: config.username.clone().unwrap_or_default(),
            http_client,
            base_url: DEFAULT_BASE_URL.to_string(),
            page_limit: config.page_limit,
            max_pages: config.max_pages,
            max_tags: config.max_tags,
        })
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(config: &LastFmConfig, base_url: impl Into<String>) -> Self {
        Self {
            api_key: config.api_key.clone().unwrap_or_default(),
            username: config.username.clone().unwrap_or_default(),
            http_client: reqwest::Client::builder().no_proxy().build().unwrap(),
            base_url: base_url.into(),
            page_limit: config.page_limit,
            max_pages: config.max_pages,
            max_tags: config.max_tags,
        }
    }

    /// Fetch plays since `since` (or the recent window when `None`), oldest first.
    pub async fn fetch_recent(&self, since: Option<Watermark>) -> Result<Vec<Track>, FeedError> {
        let first = self.fetch_page(since, 1).await?;
        let total = adapter::total_pages(&first).max(1);
        let window = page_window(total, self.max_pages, since.is_some());

        if since.is_some() && total > self.max_pages {
            tracing::info!(
                "Feed has {} pages, fetching the oldest {} this cycle",
                total,
                self.max_pages
            );
        }

        let mut tracks = Vec::new();
        if *window.start() == 1 {
            tracks.extend(adapter::to_tracks(first));
        }
        for page in window.filter(|p| *p != 1) {
            let response = self.fetch_page(since, page).await?;
            tracks.extend(adapter::to_tracks(response));
        }

        tracks.sort_by_key(|t| t.played_at);
        Ok(tracks)
    }

    /// Fetch tags (and album) for a track.
    pub async fn track_info(&self, artist: &str, title: &str) -> Result<TrackInfo, FeedError> {
        let url = format!(
            "{}?method=track.getinfo&artist={}&track={}&autocorrect=1&format=json",
            self.base_url,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        );

        let response: dto::TrackInfoResponse = self.get_json(&url).await?;
        Ok(adapter::to_track_info(response, self.max_tags))
    }

    async fn fetch_page(
        &self,
        since: Option<Watermark>,
        page: u32,
    ) -> Result<dto::RecentTracksResponse, FeedError> {
        let mut url = format!(
            "{}?method=user.getrecenttracks&user={}&limit={}&page={}&format=json",
            self.base_url,
            urlencoding::encode(&self.username),
            self.page_limit,
            page
        );
        if let Some(wm) = since {
            url.push_str(&format!("&from={}", wm.value()));
        }

        self.get_json(&url).await
    }

    /// GET `url` (api key appended here so it never reaches the logs) and decode.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FeedError> {
        tracing::debug!("GET {}", url);
        let full_url = format!("{}&api_key={}", url, urlencoding::encode(&self.api_key));

        let response = self
            .http_client
            .get(&full_url)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FeedError::RateLimited);
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<dto::ApiError>(&body) {
                return Err(map_api_error(error));
            }
            return Err(FeedError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        decode_body(&body)
    }
}

/// Decode a 200 body, which may still be a Last.fm error object.
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, FeedError> {
    match serde_json::from_str::<T>(body) {
        Ok(value) => Ok(value),
        Err(parse_error) => match serde_json::from_str::<dto::ApiError>(body) {
            Ok(error) => Err(map_api_error(error)),
            Err(_) => Err(FeedError::Parse(parse_error.to_string())),
        },
    }
}

fn map_api_error(error: dto::ApiError) -> FeedError {
    match error.error {
        ERROR_NOT_FOUND => FeedError::NotFound,
        ERROR_RATE_LIMIT => FeedError::RateLimited,
        code => FeedError::Api {
            code,
            message: error.message,
        },
    }
}

/// Pages to fetch this cycle.
///
/// First run: page 1 only. Resuming: all pages since the watermark, or the
/// oldest `max_pages` of them.
fn page_window(total_pages: u32, max_pages: u32, resuming: bool) -> RangeInclusive<u32> {
    let max_pages = max_pages.max(1);
    if !resuming {
        1..=1
    } else if total_pages <= max_pages {
        1..=total_pages.max(1)
    } else {
        (total_pages - max_pages + 1)..=total_pages
    }
}
