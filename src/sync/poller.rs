//! The poll cycle and the unattended loop around it.
//!
//! One cycle: sweep stale temp files, fetch plays since the watermark, then
//! handle each play oldest first and strictly one at a time. Per-track errors
//! are logged and contained; only a feed failure ends a cycle early. The loop
//! sleeps the full interval after every cycle, failed or not.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::tracker::{CycleTracker, Decision};
use crate::error::{Error, Result};
use crate::lastfm::resolve_metadata;
use crate::media::{Pipeline, cleanup_stale_temp_files};
use crate::model::{MediaTags, Track, Watermark};
use crate::traits::{ScrobbleFeed, TrackInfoApi, VideoSearch, WatermarkStore};
use crate::video::resolve_candidate;

/// Summary of one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Plays returned by the feed
    pub fetched: usize,
    /// Tracks acquired this cycle
    pub downloaded: usize,
    /// Tracks whose file already existed
    pub already_present: usize,
    /// Tracks that failed (eligible for retry next cycle)
    pub failed: usize,
    /// Repeat plays of a track that already failed this cycle
    pub skipped: usize,
    /// Watermark after the cycle
    pub watermark: Option<Watermark>,
}

/// Drives poll cycles against injected collaborators.
pub struct Poller {
    feed: Arc<dyn ScrobbleFeed>,
    track_info: Arc<dyn TrackInfoApi>,
    search: Arc<dyn VideoSearch>,
    pipeline: Pipeline,
    store: Arc<dyn WatermarkStore>,
    search_results: usize,
}

impl Poller {
    pub fn new(
        feed: Arc<dyn ScrobbleFeed>,
        track_info: Arc<dyn TrackInfoApi>,
        search: Arc<dyn VideoSearch>,
        pipeline: Pipeline,
        store: Arc<dyn WatermarkStore>,
    ) -> Self {
        Self {
            feed,
            track_info,
            search,
            pipeline,
            store,
            search_results: 10,
        }
    }

    /// Number of search hits ranked per track.
    pub fn with_search_results(mut self, n: usize) -> Self {
        self.search_results = n.max(1);
        self
    }

    /// Read the persisted watermark. An unreadable one restarts from the
    /// feed's recent window; existing files keep that from re-downloading.
    pub fn load_watermark(&self) -> Option<Watermark> {
        match self.store.load() {
            Ok(Some(wm)) => {
                tracing::info!("Resuming from watermark {}", wm);
                Some(wm)
            }
            Ok(None) => {
                tracing::info!("No watermark yet, starting from recent history");
                None
            }
            Err(e) => {
                tracing::error!("{}, starting from recent history", Error::State(e));
                None
            }
        }
    }

    /// Run one cycle from `watermark`.
    ///
    /// Fails only with [`Error::FeedUnavailable`]; the watermark is then
    /// unchanged.
    pub async fn run_cycle(&self, watermark: Option<Watermark>) -> Result<CycleReport> {
        let removed = cleanup_stale_temp_files(&[
            self.pipeline.download_dir(),
            self.pipeline.output_dir(),
        ]);
        if removed > 0 {
            tracing::info!("Removed {} stale temp files", removed);
        }

        tracing::info!("Polling Last.fm for recent tracks");
        let tracks = self.feed.fetch(watermark).await?;

        let mut report = CycleReport {
            fetched: tracks.len(),
            ..Default::default()
        };
        let mut tracker = CycleTracker::new(watermark);

        for track in &tracks {
            let final_path = self.pipeline.final_path(track);

            match tracker.decide(track, &final_path) {
                Decision::AlreadyPresent => {
                    tracing::debug!("Already have {:?}", final_path);
                    report.already_present += 1;
                }
                Decision::FailedThisCycle => {
                    tracing::debug!("Skipping repeat of failed {}", track);
                    report.skipped += 1;
                    continue;
                }
                Decision::Process => match self.process_track(track).await {
                    Ok(_) => report.downloaded += 1,
                    Err(e) => {
                        tracing::error!("Failed {}: {}", track, e);
                        report.failed += 1;
                        tracker.fail(final_path);
                        continue;
                    }
                },
            }

            if let Some(wm) = tracker.confirm(track) {
                self.persist(wm);
            }
        }

        report.watermark = tracker.watermark();
        Ok(report)
    }

    /// Resolve, look up tags and acquire one track.
    async fn process_track(&self, track: &Track) -> Result<PathBuf> {
        tracing::info!("Processing {}", track);

        let candidate = resolve_candidate(self.search.as_ref(), track, self.search_results)
            .await
            .ok_or_else(|| Error::no_candidate(track.search_query()))?;
        tracing::info!("Selected {:?} ({})", candidate.title, candidate.url);

        let info = resolve_metadata(self.track_info.as_ref(), track).await;
        let tags = MediaTags::for_track(track, info.tags, info.album.as_deref());

        self.pipeline.acquire(&candidate, track, &tags).await
    }

    fn persist(&self, watermark: Watermark) {
        if let Err(e) = self.store.save(watermark) {
            // Kept in memory; a restart re-checks files from the older value
            tracing::error!("{}", Error::State(e));
        }
    }

    /// Poll forever, sleeping `interval` after every cycle, until `shutdown`
    /// resolves. Shutdown is honored between cycles and during the sleep.
    pub async fn run_loop(
        &self,
        mut watermark: Option<Watermark>,
        interval: Duration,
        shutdown: impl Future<Output = ()>,
    ) {
        tokio::pin!(shutdown);

        loop {
            match self.run_cycle(watermark).await {
                Ok(report) => {
                    tracing::info!(
                        "Cycle done: {} fetched, {} downloaded, {} present, {} failed",
                        report.fetched,
                        report.downloaded,
                        report.already_present,
                        report.failed
                    );
                    watermark = report.watermark;
                }
                Err(e) => tracing::error!("Poll cycle failed: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, stopping poller");
                    return;
                }
            }
        }
    }
}
