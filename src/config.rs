//! Configuration system using a TOML file plus environment overrides.
//!
//! The config file is optional. It is looked up at `--config PATH`, then at
//! `<APP_DATA_PATH>/config.toml`, then in the OS-standard config directory:
//! - Windows: %APPDATA%\fmtv\config.toml
//! - macOS: ~/Library/Application Support/fmtv/config.toml
//! - Linux: ~/.config/fmtv/config.toml
//!
//! Environment variables always win over file values, so a container can be
//! configured with env vars alone (`LASTFM_API_KEY`, `DOWNLOAD_PATH`, ...).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::media::Container;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scrobble feed settings
    pub lastfm: LastFmConfig,

    /// Filesystem locations
    pub paths: PathsConfig,

    /// Poll loop timing
    pub poll: PollConfig,

    /// Video search/download settings
    pub video: VideoConfig,

    /// Log file settings
    pub logging: LogConfig,
}

/// Last.fm credentials and paging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LastFmConfig {
    pub api_key: Option<String>,
    pub username: Option<String>,
    /// Entries per feed page (API maximum is 200)
    pub page_limit: u32,
    /// Upper bound on pages fetched per cycle
    pub max_pages: u32,
    /// Descriptive tags kept for the genre field
    pub max_tags: usize,
}

impl Default for LastFmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            username: None,
            page_limit: 200,
            max_pages: 5,
            max_tags: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Working directory for temporary per-track files
    pub download_dir: PathBuf,
    /// Where finished files go (defaults to `download_dir`)
    pub output_dir: Option<PathBuf>,
    /// Watermark and log files
    pub app_data_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("/downloads"),
            output_dir: None,
            app_data_dir: PathBuf::from("/appdata"),
        }
    }
}

impl PathsConfig {
    /// Directory holding final assets.
    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.download_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Sleep between cycles
    pub interval_secs: u64,
    /// Upper bound for any single yt-dlp/ffmpeg invocation
    pub command_timeout_secs: u64,
    /// Upper bound for any single HTTP request
    pub http_timeout_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            command_timeout_secs: 900,
            http_timeout_secs: 30,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Number of search results to rank
    pub search_results: usize,
    /// Search through the YouTube Data API instead of yt-dlp
    pub use_data_api: bool,
    /// YouTube Data API key (required when `use_data_api` is set)
    pub api_key: Option<String>,
    pub ytdlp_path: PathBuf,
    pub ffmpeg_path: PathBuf,
    /// Output container extension
    pub container: String,
    /// Embed the video thumbnail as cover art
    pub embed_thumbnail: bool,
}

impl VideoConfig {
    /// Parsed output container; unknown values fall back to mp4 (rejected by validation).
    pub fn container(&self) -> Container {
        Container::parse(&self.container).unwrap_or_default()
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            search_results: 10,
            use_data_api: false,
            api_key: None,
            ytdlp_path: PathBuf::from("yt-dlp"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            container: "mp4".to_string(),
            embed_thumbnail: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Rotated log files kept on disk
    pub max_files: usize,
    /// Log file name prefix inside the app-state directory
    pub file_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_files: 28,
            file_name: "downloader.log".to_string(),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Get the OS-standard config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fmtv"))
}

/// Pick the config file to read, if any exists.
fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let app_data = std::env::var_os("APP_DATA_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathsConfig::default().app_data_dir);

    [
        Some(app_data.join("config.toml")),
        config_dir().map(|d| d.join("config.toml")),
    ]
    .into_iter()
    .flatten()
    .find(|p| p.exists())
}

/// A diagnostic raised while loading, before any subscriber is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadNote {
    Info(String),
    Warn(String),
    Error(String),
}

impl LoadNote {
    /// Log the note through `tracing`; call once logging is set up.
    pub fn emit(&self) {
        match self {
            LoadNote::Info(msg) => tracing::info!("{}", msg),
            LoadNote::Warn(msg) => tracing::warn!("{}", msg),
            LoadNote::Error(msg) => tracing::error!("{}", msg),
        }
    }
}

/// Result of [`load`]: the configuration plus what happened while building it.
#[derive(Debug)]
pub struct Loaded {
    pub config: Config,
    pub notes: Vec<LoadNote>,
}

/// Load configuration from disk and the process environment.
///
/// A missing or unparseable file falls back to defaults; env overrides are
/// applied either way. Problems are returned as [`LoadNote`]s because the
/// log destination itself comes from the config. Call [`Config::validate`]
/// before use.
pub fn load(explicit: Option<&Path>) -> Loaded {
    let mut notes = Vec::new();
    let mut config = match resolve_config_path(explicit) {
        Some(path) => read_file(&path, &mut notes),
        None => {
            notes.push(LoadNote::Info(
                "No config file found, using defaults and environment".to_string(),
            ));
            Config::default()
        }
    };

    notes.extend(config.apply_env(|key| std::env::var(key).ok()));
    Loaded { config, notes }
}

fn read_file(path: &Path, notes: &mut Vec<LoadNote>) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                notes.push(LoadNote::Info(format!("Loaded config from {:?}", path)));
                config
            }
            Err(e) => {
                notes.push(LoadNote::Error(format!(
                    "Failed to parse config file {:?}: {}",
                    path, e
                )));
                notes.push(LoadNote::Warn("Using default configuration".to_string()));
                Config::default()
            }
        },
        Err(e) => {
            notes.push(LoadNote::Error(format!(
                "Failed to read config file {:?}: {}",
                path, e
            )));
            Config::default()
        }
    }
}

impl Config {
    /// Apply environment overrides using `lookup` (injected for tests).
    ///
    /// Unparseable numeric/bool values are ignored and returned as warnings.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<LoadNote> {
        let mut notes = Vec::new();
        let text = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = text("LASTFM_API_KEY") {
            self.lastfm.api_key = Some(v);
        }
        if let Some(v) = text("LASTFM_USERNAME") {
            self.lastfm.username = Some(v);
        }
        if let Some(v) = text("DOWNLOAD_PATH") {
            self.paths.download_dir = PathBuf::from(v);
        }
        if let Some(v) = text("OUTPUT_PATH") {
            self.paths.output_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = text("APP_DATA_PATH") {
            self.paths.app_data_dir = PathBuf::from(v);
        }
        if let Some(v) = text("YOUTUBE_API_KEY") {
            self.video.api_key = Some(v);
        }
        if let Some(v) = text("YTDLP_PATH") {
            self.video.ytdlp_path = PathBuf::from(v);
        }
        if let Some(v) = text("FFMPEG_PATH") {
            self.video.ffmpeg_path = PathBuf::from(v);
        }
        if let Some(v) = text("OUTPUT_CONTAINER") {
            self.video.container = v.trim().trim_start_matches('.').to_string();
        }

        parse_into(&text, "LASTFM_PAGE_LIMIT", &mut self.lastfm.page_limit, &mut notes);
        parse_into(&text, "LASTFM_MAX_PAGES", &mut self.lastfm.max_pages, &mut notes);
        parse_into(&text, "LASTFM_MAX_TAGS", &mut self.lastfm.max_tags, &mut notes);
        parse_into(&text, "POLLING_INTERVAL", &mut self.poll.interval_secs, &mut notes);
        parse_into(&text, "COMMAND_TIMEOUT", &mut self.poll.command_timeout_secs, &mut notes);
        parse_into(&text, "HTTP_TIMEOUT", &mut self.poll.http_timeout_secs, &mut notes);
        parse_into(&text, "VIDEO_SEARCH_RESULTS", &mut self.video.search_results, &mut notes);
        parse_into(&text, "YOUTUBE_USE_DATA_API", &mut self.video.use_data_api, &mut notes);
        parse_into(&text, "EMBED_THUMBNAIL", &mut self.video.embed_thumbnail, &mut notes);
        parse_into(&text, "LOG_MAX_FILES", &mut self.logging.max_files, &mut notes);
        notes
    }

    /// Check that everything the poll loop needs is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lastfm.api_key.is_none() {
            return Err(ConfigError::Missing("lastfm.api_key (LASTFM_API_KEY)"));
        }
        if self.lastfm.username.is_none() {
            return Err(ConfigError::Missing("lastfm.username (LASTFM_USERNAME)"));
        }
        if self.video.use_data_api && self.video.api_key.is_none() {
            return Err(ConfigError::Missing("video.api_key (YOUTUBE_API_KEY)"));
        }
        if self.poll.interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "poll.interval_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if Container::parse(&self.video.container).is_none() {
            return Err(ConfigError::Invalid {
                key: "video.container",
                message: format!("unsupported container {:?} (mp4 or mkv)", self.video.container),
            });
        }
        if self.lastfm.page_limit == 0 || self.lastfm.max_pages == 0 {
            return Err(ConfigError::Invalid {
                key: "lastfm.page_limit",
                message: "page limit and page count must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_into<T: std::str::FromStr>(
    text: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
    notes: &mut Vec<LoadNote>,
) {
    if let Some(raw) = text(key) {
        match raw.trim().parse::<T>() {
            Ok(v) => *target = v,
            Err(_) => notes.push(LoadNote::Warn(format!(
                "Ignoring unparseable {}={:?}",
                key, raw
            ))),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

// ============================================================================
// Tests
// ============================================================================
