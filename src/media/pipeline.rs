//! Acquisition pipeline: one resolved video in, one final tagged file out.
//!
//! ```text
//! download video ─┐
//!                 ├─> merge ─> placeholder check ─> tag ─> rename ─> [cover ─> rename]
//! download audio ─┘
//! ```
//!
//! Every intermediate lives under a per-track temp name. The canonical path
//! is only ever written by `rename`, so an observer sees either nothing, the
//! tagged file, or the tagged file with its cover; never a partial write.
//! Temp files are removed when the track finishes, on every path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Container, MuxRequest, StreamKind, is_static_placeholder};
use crate::error::{Error, Result, ResultExt};
use crate::model::{MediaTags, Track, VideoCandidate};
use crate::traits::{ImageFetch, MediaTool, StreamDownloader};

/// Staged intermediates are named `<stem>.<stage>.tmp.<ext>`.
const TEMP_STAGES: [&str; 3] = ["merged", "tagged", "cover"];
const TEMP_EXTENSIONS: [&str; 3] = ["mp4", "mkv", "jpg"];

/// Temp paths for one track. Removes whatever exists when dropped.
struct TempFiles {
    video: PathBuf,
    audio: PathBuf,
    merged: PathBuf,
    tagged: PathBuf,
    cover_image: PathBuf,
    covered: PathBuf,
}

impl TempFiles {
    fn new(stem: &str, download_dir: &Path, output_dir: &Path, ext: &str) -> Self {
        Self {
            video: download_dir.join(format!("{}.{}", stem, StreamKind::Video.temp_suffix())),
            audio: download_dir.join(format!("{}.{}", stem, StreamKind::Audio.temp_suffix())),
            merged: download_dir.join(format!("{}.merged.tmp.{}", stem, ext)),
            // Same directory as the final file so the rename stays atomic
            tagged: output_dir.join(format!("{}.tagged.tmp.{}", stem, ext)),
            cover_image: download_dir.join(format!("{}.cover.tmp.jpg", stem)),
            covered: output_dir.join(format!("{}.cover.tmp.{}", stem, ext)),
        }
    }

    fn stream(&self, kind: StreamKind) -> &Path {
        match kind {
            StreamKind::Video => &self.video,
            StreamKind::Audio => &self.audio,
        }
    }

    fn all(&self) -> [&Path; 6] {
        [
            self.video.as_path(),
            self.audio.as_path(),
            self.merged.as_path(),
            self.tagged.as_path(),
            self.cover_image.as_path(),
            self.covered.as_path(),
        ]
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        for path in self.all() {
            remove_quietly(path);
        }
    }
}

fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed {:?}", path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Could not remove {:?}: {}", path, e),
    }
}

/// Downloads, merges, validates and tags one video.
pub struct Pipeline {
    downloader: Arc<dyn StreamDownloader>,
    media: Arc<dyn MediaTool>,
    images: Option<Arc<dyn ImageFetch>>,
    download_dir: PathBuf,
    output_dir: PathBuf,
    container: Container,
}

impl Pipeline {
    pub fn new(
        downloader: Arc<dyn StreamDownloader>,
        media: Arc<dyn MediaTool>,
        download_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        container: Container,
    ) -> Self {
        Self {
            downloader,
            media,
            images: None,
            download_dir: download_dir.into(),
            output_dir: output_dir.into(),
            container,
        }
    }

    /// Embed candidate thumbnails as cover art.
    pub fn with_thumbnails(mut self, images: Arc<dyn ImageFetch>) -> Self {
        self.images = Some(images);
        self
    }

    /// Canonical output path for `track`.
    pub fn final_path(&self, track: &Track) -> PathBuf {
        track.canonical_path(&self.output_dir, self.container.extension())
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Acquire `candidate` for `track` and publish it at [`Self::final_path`].
    pub async fn acquire(
        &self,
        candidate: &VideoCandidate,
        track: &Track,
        tags: &MediaTags,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .with_context(format!("creating {:?}", self.download_dir))?;
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(format!("creating {:?}", self.output_dir))?;

        let final_path = self.final_path(track);
        let temp = TempFiles::new(
            &track.canonical_stem(),
            &self.download_dir,
            &self.output_dir,
            self.container.extension(),
        );

        for kind in [StreamKind::Video, StreamKind::Audio] {
            self.downloader
                .download(&candidate.url, kind, temp.stream(kind))
                .await
                .map_err(|e| Error::acquisition(format!("{} stream of {}: {}", kind, track, e)))?;
        }
        for kind in [StreamKind::Video, StreamKind::Audio] {
            if !temp.stream(kind).exists() {
                return Err(Error::acquisition(format!(
                    "no {} file at {:?} after download",
                    kind,
                    temp.stream(kind)
                )));
            }
        }

        tracing::info!("Merging streams for {}", track);
        self.run_mux(&MuxRequest::Merge {
            video: temp.video.clone(),
            audio: temp.audio.clone(),
            output: temp.merged.clone(),
        })
        .await?;

        if is_static_placeholder(self.media.as_ref(), &temp.merged).await {
            remove_quietly(&temp.merged);
            return Err(Error::DegenerateOutput(final_path));
        }

        self.run_mux(&MuxRequest::Tag {
            input: temp.merged.clone(),
            tags: tags.clone(),
            output: temp.tagged.clone(),
        })
        .await?;
        publish(&temp.tagged, &final_path).await?;

        if let (Some(images), Some(url)) = (&self.images, candidate.thumbnail_url.as_deref()) {
            match self.embed_cover(images.as_ref(), url, &final_path, &temp).await {
                Ok(()) => tracing::debug!("Embedded cover from {}", url),
                Err(e) => tracing::warn!("Keeping {} without cover art: {}", track, e),
            }
        }

        tracing::info!("Saved {:?}", final_path);
        Ok(final_path)
    }

    async fn embed_cover(
        &self,
        images: &dyn ImageFetch,
        url: &str,
        final_path: &Path,
        temp: &TempFiles,
    ) -> Result<()> {
        let jpeg = images
            .fetch_jpeg(url)
            .await
            .map_err(|e| Error::acquisition(format!("thumbnail {}: {}", url, e)))?;
        tokio::fs::write(&temp.cover_image, jpeg)
            .await
            .with_context("writing thumbnail")?;

        self.run_mux(&MuxRequest::AttachCover {
            input: final_path.to_path_buf(),
            image: temp.cover_image.clone(),
            output: temp.covered.clone(),
        })
        .await?;
        publish(&temp.covered, final_path).await
    }

    async fn run_mux(&self, request: &MuxRequest) -> Result<()> {
        self.media
            .mux(request)
            .await
            .map_err(|e| Error::mux(format!("{} step: {}", request.step(), e)))?;

        if !request.output().exists() {
            return Err(Error::mux(format!(
                "{} step produced no file at {:?}",
                request.step(),
                request.output()
            )));
        }
        Ok(())
    }
}

/// Atomically move a finished temp file onto the canonical path.
async fn publish(from: &Path, to: &Path) -> Result<()> {
    tokio::fs::rename(from, to)
        .await
        .with_context(format!("replacing {:?}", to))
}

/// Whether `name` has the exact shape of a per-track intermediate.
///
/// The output directory is the user's library, so a marker appearing
/// elsewhere in a name (`X - Mix.video.tmp edit.mp4`) does not count.
fn is_temp_file_name(name: &str) -> bool {
    let has_suffix = |suffix: &str| {
        name.strip_suffix(suffix)
            .is_some_and(|stem| !stem.is_empty())
    };

    let stream = [StreamKind::Video, StreamKind::Audio]
        .iter()
        .any(|kind| has_suffix(&format!(".{}", kind.temp_suffix())));

    stream
        || TEMP_STAGES.iter().any(|stage| {
            TEMP_EXTENSIONS
                .iter()
                .any(|ext| has_suffix(&format!(".{}.tmp.{}", stage, ext)))
        })
}

/// Delete intermediates left behind by an interrupted run.
///
/// Only safe while no track is in flight. Returns the number of files removed.
pub fn cleanup_stale_temp_files(dirs: &[&Path]) -> usize {
    let mut removed = 0;

    for dir in dirs {
        for entry in walkdir::WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let name = entry.file_name().to_string_lossy();
            if is_temp_file_name(&name) {
                tracing::info!("Removing stale temp file {:?}", entry.path());
                match std::fs::remove_file(entry.path()) {
                    Ok(()) => removed += 1,
                    Err(e) => tracing::warn!("Could not remove {:?}: {}", entry.path(), e),
                }
            }
        }
    }

    removed
}
