//! Media processing: stream acquisition, muxing, tagging, and output checks.
//!
//! # Architecture
//!
//! - **ffmpeg** (`ffmpeg.rs`) - merge, tag and cover re-muxes, frame extraction
//! - **Detector** (`detector.rs`) - static placeholder detection
//! - **Thumbnail** (`thumbnail.rs`) - fetch and normalize cover images
//! - **Pipeline** (`pipeline.rs`) - download, merge, check, tag, publish
//!
//! Only the pipeline ever writes to the canonical output path, and only by
//! renaming a finished temp file onto it.

pub mod detector;
pub mod ffmpeg;
pub mod pipeline;
pub mod thumbnail;

pub use detector::is_static_placeholder;
pub use ffmpeg::FfmpegTool;
pub use pipeline::{Pipeline, cleanup_stale_temp_files};
pub use thumbnail::ThumbnailClient;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::model::MediaTags;
use crate::tools::ToolError;

/// Which elementary stream of a video to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    /// yt-dlp format selector. MP4/M4A first so a copy-merge into mp4 works.
    pub fn format_selector(self) -> &'static str {
        match self {
            StreamKind::Video => "bestvideo[ext=mp4]/bestvideo",
            StreamKind::Audio => "bestaudio[ext=m4a]/bestaudio",
        }
    }

    /// Suffix of the per-stream temp file.
    pub fn temp_suffix(self) -> &'static str {
        match self {
            StreamKind::Video => "video.tmp",
            StreamKind::Audio => "audio.tmp",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Video => write!(f, "video"),
            StreamKind::Audio => write!(f, "audio"),
        }
    }
}

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Container {
    #[default]
    Mp4,
    Mkv,
}

impl Container {
    pub fn extension(self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Mkv => "mkv",
        }
    }

    /// ffmpeg muxer name, needed because temp files don't end in the extension.
    pub fn muxer(self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Mkv => "matroska",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mp4" | "m4v" => Some(Container::Mp4),
            "mkv" | "matroska" => Some(Container::Mkv),
            _ => None,
        }
    }
}

/// One ffmpeg re-mux. Every variant copies streams without re-encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum MuxRequest {
    /// Combine separately downloaded video and audio streams.
    Merge {
        video: PathBuf,
        audio: PathBuf,
        output: PathBuf,
    },
    /// Rewrite container metadata.
    Tag {
        input: PathBuf,
        tags: MediaTags,
        output: PathBuf,
    },
    /// Attach a JPEG as the cover image.
    AttachCover {
        input: PathBuf,
        image: PathBuf,
        output: PathBuf,
    },
}

impl MuxRequest {
    pub fn output(&self) -> &Path {
        match self {
            MuxRequest::Merge { output, .. }
            | MuxRequest::Tag { output, .. }
            | MuxRequest::AttachCover { output, .. } => output,
        }
    }

    /// Short name for logs.
    pub fn step(&self) -> &'static str {
        match self {
            MuxRequest::Merge { .. } => "merge",
            MuxRequest::Tag { .. } => "tag",
            MuxRequest::AttachCover { .. } => "cover",
        }
    }
}

/// Errors from media processing
#[derive(Debug, Clone, thiserror::Error)]
pub enum MediaError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("IO error: {0}")]
    Io(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Image decode failed: {0}")]
    Decode(String),

    #[error("No frame decoded at {0:?}")]
    EmptyFrame(std::time::Duration),
}

impl From<std::io::Error> for MediaError {
    fn from(e: std::io::Error) -> Self {
        MediaError::Io(e.to_string())
    }
}
