//! YouTube Data API v3 search backend
//!
//! Optional alternative to yt-dlp search that returns full titles,
//! descriptions and thumbnails. Requires an API key; enabling it without one
//! is a startup configuration error.
//! API docs: https://developers.google.com/youtube/v3/docs/search/list

mod adapter;
mod client;
pub mod dto;

pub use adapter::to_candidates;
pub use client::YouTubeApiClient;
