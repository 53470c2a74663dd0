//! yt-dlp subprocess client

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{adapter, dto};
use crate::media::{MediaError, StreamKind};
use crate::model::VideoCandidate;
use crate::tools;
use crate::video::VideoError;

/// yt-dlp wrapper used for searching and downloading
pub struct YtDlp {
    program: PathBuf,
    timeout: Duration,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Search YouTube and return candidates in result order.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<VideoCandidate>, VideoError> {
        let output = tools::run(&self.program, search_args(query, limit), self.timeout).await?;
        let playlist: dto::SearchPlaylist = serde_json::from_slice(&output.stdout)
            .map_err(|e| VideoError::Parse(format!("yt-dlp search output: {}", e)))?;

        Ok(adapter::to_candidates(playlist))
    }

    /// Download one stream of `url` to exactly `dest`.
    pub async fn download(
        &self,
        url: &str,
        kind: StreamKind,
        dest: &Path,
    ) -> Result<(), MediaError> {
        tracing::info!("Downloading {} stream of {}", kind, url);
        tools::run(&self.program, download_args(url, kind, dest), self.timeout).await?;
        Ok(())
    }

    /// Version string, if yt-dlp is installed.
    pub async fn version(&self) -> Option<String> {
        tools::version(&self.program, "--version").await
    }
}

fn search_args(query: &str, limit: usize) -> Vec<String> {
    vec![
        "--dump-single-json".to_string(),
        "--flat-playlist".to_string(),
        "--no-warnings".to_string(),
        format!("ytsearch{}:{}", limit.max(1), query),
    ]
}

fn download_args(url: &str, kind: StreamKind, dest: &Path) -> Vec<String> {
    vec![
        "--format".to_string(),
        kind.format_selector().to_string(),
        "--no-playlist".to_string(),
        "--no-part".to_string(),
        "--no-progress".to_string(),
        "--no-warnings".to_string(),
        "--force-overwrites".to_string(),
        "--output".to_string(),
        escape_output_template(dest),
        url.to_string(),
    ]
}

/// `--output` is a template; a literal `%` in a track name must be doubled.
fn escape_output_template(path: &Path) -> String {
    path.to_string_lossy().replace('%', "%%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_args() {
        let args = search_args("Air Sexy Boy", 10);
        assert_eq!(args.last().unwrap(), "ytsearch10:Air Sexy Boy");
        assert!(args.contains(&"--flat-playlist".to_string()));
    }

    #[test]
    fn test_search_limit_at_least_one() {
        let args = search_args("q", 0);
        assert_eq!(args.last().unwrap(), "ytsearch1:q");
    }

    #[test]
    fn test_download_args_select_stream() {
        let args = download_args(
            "https://www.youtube.com/watch?v=abc",
            StreamKind::Audio,
            Path::new("/dl/Air - Sexy Boy.audio.tmp"),
        );
        let format_index = args.iter().position(|a| a == "--format").unwrap();
        assert_eq!(args[format_index + 1], StreamKind::Audio.format_selector());
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=abc");
    }

    #[test]
    fn test_output_template_escapes_percent() {
        assert_eq!(
            escape_output_template(Path::new("/dl/100% Pure.video.tmp")),
            "/dl/100%% Pure.video.tmp"
        );
    }

    #[tokio::test]
    async fn test_search_with_missing_binary_fails() {
        let ytdlp = YtDlp::new("/nonexistent/yt-dlp", Duration::from_secs(5));
        let result = ytdlp.search("anything", 3).await;
        assert!(matches!(result, Err(VideoError::Tool(_))));
    }
}
