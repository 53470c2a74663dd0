//! Trait definitions for every external collaborator of the poll cycle.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the real clients (Last.fm, yt-dlp, ffmpeg, ...),
//! while tests substitute the mock implementations in [`mocks`].
//!
//! # Example
//!
//! ```ignore
//! use crate::traits::VideoSearch;
//!
//! // In production code:
//! async fn process(search: &dyn VideoSearch, track: &Track) {
//!     let hits = search.search(&track.search_query(), 10).await?;
//! }
//!
//! // In tests:
//! let search = MockVideoSearch::with_titles(&["Air - Sexy Boy (Official Video)"]);
//! ```

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::lastfm::{FeedError, TrackInfo};
use crate::media::{MediaError, MuxRequest, StreamKind};
use crate::model::{Track, VideoCandidate, Watermark};
use crate::sync::WatermarkError;
use crate::video::VideoError;

/// Source of play events.
#[async_trait]
pub trait ScrobbleFeed: Send + Sync {
    /// Plays after `since` (or the recent window when `None`), oldest first.
    async fn fetch(&self, since: Option<Watermark>) -> Result<Vec<Track>, FeedError>;
}

/// Descriptive tag lookup.
#[async_trait]
pub trait TrackInfoApi: Send + Sync {
    async fn track_info(&self, artist: &str, title: &str) -> Result<TrackInfo, FeedError>;
}

/// Video platform search.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Up to `limit` hits for `query`, in backend relevance order.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoCandidate>, VideoError>;
}

/// Downloads one elementary stream of a video to an exact path.
#[async_trait]
pub trait StreamDownloader: Send + Sync {
    async fn download(&self, url: &str, kind: StreamKind, dest: &Path) -> Result<(), MediaError>;
}

/// Transcode/mux utility.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Run one stream-copy re-mux, writing `request.output()`.
    async fn mux(&self, request: &MuxRequest) -> Result<(), MediaError>;

    /// Decode one frame at `offset` into a raw raster buffer.
    async fn extract_frame(&self, path: &Path, offset: Duration) -> Result<Vec<u8>, MediaError>;
}

/// Fetches an image and normalizes it to JPEG.
#[async_trait]
pub trait ImageFetch: Send + Sync {
    async fn fetch_jpeg(&self, url: &str) -> Result<Vec<u8>, MediaError>;
}

/// Persistence for the watermark. Blocking; called once per confirmed track.
pub trait WatermarkStore: Send + Sync {
    fn load(&self) -> Result<Option<Watermark>, WatermarkError>;
    fn save(&self, watermark: Watermark) -> Result<(), WatermarkError>;
}

// Implement traits for real clients

#[async_trait]
impl ScrobbleFeed for crate::lastfm::LastFmClient {
    async fn fetch(&self, since: Option<Watermark>) -> Result<Vec<Track>, FeedError> {
        self.fetch_recent(since).await
    }
}

#[async_trait]
impl TrackInfoApi for crate::lastfm::LastFmClient {
    async fn track_info(&self, artist: &str, title: &str) -> Result<TrackInfo, FeedError> {
        self.track_info(artist, title).await
    }
}

#[async_trait]
impl VideoSearch for crate::video::YtDlp {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoCandidate>, VideoError> {
        self.search(query, limit).await
    }
}

#[async_trait]
impl VideoSearch for crate::video::YouTubeApiClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoCandidate>, VideoError> {
        self.search(query, limit).await
    }
}

#[async_trait]
impl StreamDownloader for crate::video::YtDlp {
    async fn download(&self, url: &str, kind: StreamKind, dest: &Path) -> Result<(), MediaError> {
        self.download(url, kind, dest).await
    }
}

#[async_trait]
impl MediaTool for crate::media::FfmpegTool {
    async fn mux(&self, request: &MuxRequest) -> Result<(), MediaError> {
        self.mux(request).await
    }

    async fn extract_frame(&self, path: &Path, offset: Duration) -> Result<Vec<u8>, MediaError> {
        self.extract_frame(path, offset).await
    }
}

#[async_trait]
impl ImageFetch for crate::media::ThumbnailClient {
    async fn fetch_jpeg(&self, url: &str) -> Result<Vec<u8>, MediaError> {
        self.fetch_jpeg(url).await
    }
}

/// Mock collaborators for testing.
///
/// Each mock returns configurable responses and records how it was called.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::tools::ToolError;

    /// Mock feed that returns predefined tracks.
    pub struct MockFeed {
        /// Tracks to return from fetch
        pub tracks: Vec<Track>,
        /// Error to return (takes precedence over tracks)
        pub error: Option<FeedError>,
        calls: Mutex<Vec<Option<Watermark>>>,
    }

    impl MockFeed {
        pub fn with_tracks(tracks: Vec<Track>) -> Self {
            Self {
                tracks,
                error: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_error(error: FeedError) -> Self {
            Self {
                tracks: vec![],
                error: Some(error),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// The `since` argument of every fetch so far.
        pub fn calls(&self) -> Vec<Option<Watermark>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScrobbleFeed for MockFeed {
        async fn fetch(&self, since: Option<Watermark>) -> Result<Vec<Track>, FeedError> {
            self.calls.lock().unwrap().push(since);
            if let Some(ref err) = self.error {
                return Err(err.clone());
            }
            Ok(self.tracks.clone())
        }
    }

    /// Mock tag lookup.
    pub struct MockTrackInfo {
        pub info: TrackInfo,
        pub error: Option<FeedError>,
        calls: AtomicUsize,
    }

    impl MockTrackInfo {
        pub fn with_tags(tags: &[&str]) -> Self {
            Self {
                info: TrackInfo {
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                    album: None,
                },
                error: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_info(info: TrackInfo) -> Self {
            Self {
                info,
                error: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_error(error: FeedError) -> Self {
            Self {
                info: TrackInfo::default(),
                error: Some(error),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TrackInfoApi for MockTrackInfo {
        async fn track_info(&self, _artist: &str, _title: &str) -> Result<TrackInfo, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(ref err) = self.error {
                return Err(err.clone());
            }
            Ok(self.info.clone())
        }
    }

    /// Mock search backend.
    pub struct MockVideoSearch {
        pub candidates: Vec<VideoCandidate>,
        pub error: Option<VideoError>,
        queries: Mutex<Vec<String>>,
    }

    impl MockVideoSearch {
        /// Candidates with the given titles and placeholder URLs.
        pub fn with_titles(titles: &[&str]) -> Self {
            Self::with_candidates(
                titles
                    .iter()
                    .enumerate()
                    .map(|(i, title)| {
                        VideoCandidate::new(format!("https://video.test/watch?v={}", i), *title)
                    })
                    .collect(),
            )
        }

        pub fn with_candidates(candidates: Vec<VideoCandidate>) -> Self {
            Self {
                candidates,
                error: None,
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn with_error(error: VideoError) -> Self {
            Self {
                candidates: vec![],
                error: Some(error),
                queries: Mutex::new(Vec::new()),
            }
        }

        /// Every query searched so far.
        pub fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VideoSearch for MockVideoSearch {
        async fn search(
            &self,
            query: &str,
            limit: usize,
        ) -> Result<Vec<VideoCandidate>, VideoError> {
            self.queries.lock().unwrap().push(query.to_string());
            if let Some(ref err) = self.error {
                return Err(err.clone());
            }
            Ok(self.candidates.iter().take(limit).cloned().collect())
        }
    }

    /// What the mock downloader does on each call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum DownloadBehavior {
        /// Write a small file at the destination
        WriteFile,
        /// Exit successfully without writing anything
        SkipWrite,
        /// Fail like a non-zero yt-dlp exit
        Fail,
    }

    /// Mock stream downloader.
    pub struct MockDownloader {
        pub behavior: DownloadBehavior,
        calls: Mutex<Vec<(StreamKind, PathBuf)>>,
    }

    impl MockDownloader {
        pub fn new(behavior: DownloadBehavior) -> Self {
            Self {
                behavior,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn succeeding() -> Self {
            Self::new(DownloadBehavior::WriteFile)
        }

        pub fn calls(&self) -> Vec<(StreamKind, PathBuf)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StreamDownloader for MockDownloader {
        async fn download(
            &self,
            _url: &str,
            kind: StreamKind,
            dest: &Path,
        ) -> Result<(), MediaError> {
            self.calls.lock().unwrap().push((kind, dest.to_path_buf()));
            match self.behavior {
                DownloadBehavior::WriteFile => {
                    std::fs::write(dest, format!("{} stream", kind))?;
                    Ok(())
                }
                DownloadBehavior::SkipWrite => Ok(()),
                DownloadBehavior::Fail => Err(MediaError::Tool(ToolError::Failed {
                    tool: "yt-dlp".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "ERROR: Video unavailable".to_string(),
                })),
            }
        }
    }

    /// Mock ffmpeg.
    ///
    /// `mux` writes `"<step>:<first input contents>"` to the output (so tests
    /// can see which steps produced a file) and records the request.
    /// `extract_frame` returns `frames[offset_secs]`.
    pub struct MockMediaTool {
        /// Step name (`merge`, `tag`, `cover`) that fails after writing a partial output
        pub fail_step: Option<&'static str>,
        /// Frame returned for each whole-second offset
        pub frames: Vec<Vec<u8>>,
        requests: Mutex<Vec<MuxRequest>>,
        frame_calls: AtomicUsize,
    }

    impl MockMediaTool {
        /// Every sampled frame differs.
        pub fn moving() -> Self {
            Self::with_frames((0u8..5).map(|i| vec![i; 12]).collect())
        }

        /// Every sampled frame is identical.
        pub fn static_image() -> Self {
            Self::with_frames(vec![vec![7u8; 12]; 5])
        }

        pub fn with_frames(frames: Vec<Vec<u8>>) -> Self {
            Self {
                fail_step: None,
                frames,
                requests: Mutex::new(Vec::new()),
                frame_calls: AtomicUsize::new(0),
            }
        }

        pub fn failing(step: &'static str) -> Self {
            Self {
                fail_step: Some(step),
                ..Self::moving()
            }
        }

        pub fn requests(&self) -> Vec<MuxRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn frame_calls(&self) -> usize {
            self.frame_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MediaTool for MockMediaTool {
        async fn mux(&self, request: &MuxRequest) -> Result<(), MediaError> {
            self.requests.lock().unwrap().push(request.clone());

            let input = match request {
                MuxRequest::Merge { video, .. } => video,
                MuxRequest::Tag { input, .. } | MuxRequest::AttachCover { input, .. } => input,
            };
            let previous = std::fs::read_to_string(input)?;
            std::fs::write(request.output(), format!("{}:{}", request.step(), previous))?;

            if self.fail_step == Some(request.step()) {
                return Err(MediaError::Tool(ToolError::Failed {
                    tool: "ffmpeg".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "Conversion failed!".to_string(),
                }));
            }
            Ok(())
        }

        async fn extract_frame(
            &self,
            _path: &Path,
            offset: Duration,
        ) -> Result<Vec<u8>, MediaError> {
            self.frame_calls.fetch_add(1, Ordering::SeqCst);
            self.frames
                .get(offset.as_secs() as usize)
                .cloned()
                .ok_or(MediaError::EmptyFrame(offset))
        }
    }

    /// Mock image fetcher.
    pub struct MockImageFetch {
        pub error: Option<MediaError>,
        calls: AtomicUsize,
    }

    impl MockImageFetch {
        pub fn succeeding() -> Self {
            Self {
                error: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_error(error: MediaError) -> Self {
            Self {
                error: Some(error),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageFetch for MockImageFetch {
        async fn fetch_jpeg(&self, _url: &str) -> Result<Vec<u8>, MediaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(ref err) = self.error {
                return Err(err.clone());
            }
            // JPEG SOI/EOI markers around a dummy payload
            Ok(vec![0xFF, 0xD8, 0x00, 0xFF, 0xD9])
        }
    }

    /// In-memory watermark store.
    #[derive(Default)]
    pub struct MemoryWatermarkStore {
        value: Mutex<Option<Watermark>>,
        saves: Mutex<Vec<Watermark>>,
    }

    impl MemoryWatermarkStore {
        pub fn with_value(watermark: Watermark) -> Self {
            Self {
                value: Mutex::new(Some(watermark)),
                saves: Mutex::new(Vec::new()),
            }
        }

        pub fn current(&self) -> Option<Watermark> {
            *self.value.lock().unwrap()
        }

        /// Every saved value, in order.
        pub fn saves(&self) -> Vec<Watermark> {
            self.saves.lock().unwrap().clone()
        }
    }

    impl WatermarkStore for MemoryWatermarkStore {
        fn load(&self) -> Result<Option<Watermark>, WatermarkError> {
            Ok(self.current())
        }

        fn save(&self, watermark: Watermark) -> Result<(), WatermarkError> {
            *self.value.lock().unwrap() = Some(watermark);
            self.saves.lock().unwrap().push(watermark);
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_feed_records_since() {
            let feed = MockFeed::with_tracks(vec![Track::new("Air", "Sexy Boy", "", 5)]);
            let tracks = feed.fetch(Some(Watermark(3))).await.unwrap();
            assert_eq!(tracks.len(), 1);
            assert_eq!(feed.calls(), vec![Some(Watermark(3))]);
        }

        #[tokio::test]
        async fn test_mock_search_respects_limit() {
            let search = MockVideoSearch::with_titles(&["a", "b", "c"]);
            let hits = search.search("q", 2).await.unwrap();
            assert_eq!(hits.len(), 2);
        }

        #[tokio::test]
        async fn test_mock_media_tool_frames() {
            let tool = MockMediaTool::static_image();
            let a = tool
                .extract_frame(Path::new("x"), Duration::from_secs(0))
                .await
                .unwrap();
            let b = tool
                .extract_frame(Path::new("x"), Duration::from_secs(4))
                .await
                .unwrap();
            assert_eq!(a, b);
            assert!(
                tool.extract_frame(Path::new("x"), Duration::from_secs(9))
                    .await
                    .is_err()
            );
        }

        #[test]
        fn test_memory_store() {
            let store = MemoryWatermarkStore::default();
            assert_eq!(store.load().unwrap(), None);
            store.save(Watermark(10)).unwrap();
            assert_eq!(store.load().unwrap(), Some(Watermark(10)));
            assert_eq!(store.saves(), vec![Watermark(10)]);
        }
    }
}
