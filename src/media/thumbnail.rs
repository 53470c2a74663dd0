//! Thumbnail fetching for embedded cover art.
//!
//! Thumbnails arrive as JPEG, PNG or WebP depending on the backend. They are
//! decoded and re-encoded as baseline JPEG so both the mp4 `attached_pic`
//! stream and the Matroska attachment carry a format every player reads.

use std::io::Cursor;
use std::time::Duration;

use image::{DynamicImage, ImageFormat};

use super::MediaError;

/// Largest thumbnail body we accept.
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// HTTP client for thumbnail images
pub struct ThumbnailClient {
    http_client: reqwest::Client,
}

impl ThumbnailClient {
    pub fn new(timeout: Duration) -> Result<Self, MediaError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MediaError::Http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// Download `url` and return it re-encoded as JPEG.
    pub async fn fetch_jpeg(&self, url: &str) -> Result<Vec<u8>, MediaError> {
        tracing::debug!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| MediaError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Http(format!("HTTP {} for {}", status, url)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MediaError::Http(e.to_string()))?;

        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(MediaError::Decode(format!(
                "thumbnail too large ({} bytes)",
                bytes.len()
            )));
        }

        to_jpeg(&bytes)
    }
}

/// Decode any supported image format and re-encode it as JPEG.
pub fn to_jpeg(data: &[u8]) -> Result<Vec<u8>, MediaError> {
    let decoded = image::load_from_memory(data).map_err(|e| MediaError::Decode(e.to_string()))?;

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, ImageFormat::Jpeg)
        .map_err(|e| MediaError::Decode(e.to_string()))?;
    Ok(out.into_inner())
}
