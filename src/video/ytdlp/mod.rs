//! yt-dlp integration
//!
//! yt-dlp does double duty: it searches YouTube (`ytsearchN:<query>`) without
//! needing an API key, and it downloads the individual video/audio streams
//! the pipeline merges.
//!
//! Install yt-dlp:
//! - `pip install yt-dlp` or a release binary from https://github.com/yt-dlp/yt-dlp
//! - Set `YTDLP_PATH` when it is not on `PATH`

mod adapter;
mod client;
pub mod dto;

pub use adapter::to_candidates;
pub use client::YtDlp;
