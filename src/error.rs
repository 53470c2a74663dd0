//! Application-wide error types.
//!
//! This module provides a unified error hierarchy for the poller.
//! Library modules use specific error types via `thiserror`
//! ([`FeedError`], [`VideoError`], [`MediaError`], ...), while CLI/main
//! uses `anyhow` for convenient error propagation.
//!
//! # Recovery policy
//!
//! Every variant except [`Error::Configuration`] is recoverable: per-track
//! errors are caught at the track boundary and logged, and a
//! [`Error::FeedUnavailable`] skips the rest of the cycle. None of them
//! ever moves the watermark.
//!
//! [`FeedError`]: crate::lastfm::FeedError
//! [`VideoError`]: crate::video::VideoError
//! [`MediaError`]: crate::media::MediaError

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Feed fetch failed (network, HTTP status, or unparseable body)
    #[error("Scrobble feed unavailable: {0}")]
    FeedUnavailable(#[from] crate::lastfm::FeedError),

    /// Video search produced nothing usable for this track
    #[error("No video candidate found for {0}")]
    NoCandidateFound(String),

    /// Stream download failed or left no file behind
    #[error("Acquisition failed: {0}")]
    AcquisitionFailed(String),

    /// Merge, tag or cover re-mux exited unsuccessfully
    #[error("Mux failed: {0}")]
    MuxFailed(String),

    /// Downloaded file is a static image, not a video
    #[error("Degenerate output discarded: {0}")]
    DegenerateOutput(PathBuf),

    /// Tag lookup failed (non-fatal, tagging proceeds without genre)
    #[error("Metadata lookup failed: {0}")]
    MetadataLookupFailed(String),

    /// Invalid or missing configuration at startup
    #[error("Configuration error: {0}")]
    Configuration(#[from] crate::config::ConfigError),

    /// Watermark could not be read or persisted
    #[error("State error: {0}")]
    State(#[from] crate::sync::WatermarkError),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an acquisition error.
    pub fn acquisition(message: impl Into<String>) -> Self {
        Self::AcquisitionFailed(message.into())
    }

    /// Create a mux error.
    pub fn mux(message: impl Into<String>) -> Self {
        Self::MuxFailed(message.into())
    }

    /// Create a no-candidate error.
    pub fn no_candidate(query: impl Into<String>) -> Self {
        Self::NoCandidateFound(query.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error must stop the process instead of being retried.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Configuration(_) => true,
            Self::WithContext { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}
