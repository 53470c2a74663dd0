//! YouTube Data API HTTP client

use std::time::Duration;

use super::{adapter, dto};
use crate::model::VideoCandidate;
use crate::video::VideoError;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// YouTube Data API client
pub struct YouTubeApiClient {
    api_key: String,
    http_client: reqwest::Client,
    base_url: String,
}

impl YouTubeApiClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, VideoError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .timeout(timeout)
            .build()
            .map_err(|e| VideoError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            http_client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Search videos matching `query`, in relevance order.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<VideoCandidate>, VideoError> {
        // The API caps maxResults at 50
        let max_results = limit.clamp(1, 50);
        let url = format!(
            "{}/search?part=snippet&type=video&maxResults={}&q={}",
            self.base_url,
            max_results,
            urlencoding::encode(query)
        );
        tracing::debug!("GET {}", url);

        let response = self
            .http_client
            .get(format!("{}&key={}", url, urlencoding::encode(&self.api_key)))
            .send()
            .await
            .map_err(|e| VideoError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(VideoError::RateLimited);
        }

        if !status.is_success() {
            if let Ok(error) = response.json::<dto::ErrorResponse>().await {
                if error.error.code == 403 && error.error.message.contains("quota") {
                    return Err(VideoError::RateLimited);
                }
                return Err(VideoError::ApiError(error.error.message));
            }
            return Err(VideoError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response
            .json::<dto::SearchListResponse>()
            .await
            .map_err(|e| VideoError::Parse(e.to_string()))?;

        Ok(adapter::to_candidates(body))
    }
}
