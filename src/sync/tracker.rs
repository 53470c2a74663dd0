//! Per-cycle dedup and watermark advance.
//!
//! The canonical output file is the source of truth: a track whose file
//! exists is done, whatever the watermark says, and a track whose file is
//! missing is attempted even if the watermark already covers it.
//!
//! The watermark only moves through a contiguous run of confirmed tracks.
//! Once a track fails, later tracks in the same cycle are still attempted but
//! no longer advance it, so the next fetch (from the unchanged watermark)
//! returns the failed track again.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::model::{Track, Watermark};

/// What to do with one feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Canonical file exists; confirm without any network work
    AlreadyPresent,
    /// Same canonical file already failed earlier in this cycle
    FailedThisCycle,
    /// Resolve and acquire
    Process,
}

/// Dedup state for one poll cycle.
#[derive(Debug)]
pub struct CycleTracker {
    watermark: Option<Watermark>,
    blocked: bool,
    failed: HashSet<PathBuf>,
}

impl CycleTracker {
    pub fn new(watermark: Option<Watermark>) -> Self {
        Self {
            watermark,
            blocked: false,
            failed: HashSet::new(),
        }
    }

    /// Decide whether the track with output `final_path` needs work.
    pub fn decide(&self, track: &Track, final_path: &Path) -> Decision {
        if final_path.exists() {
            return Decision::AlreadyPresent;
        }
        if self.failed.contains(final_path) {
            return Decision::FailedThisCycle;
        }
        if self.watermark.is_some_and(|wm| wm.covers(track.played_at)) {
            tracing::debug!("Retrying {} (covered by watermark, file missing)", track);
        }
        Decision::Process
    }

    /// Record that `track` reached its final file (or already had one).
    ///
    /// Returns the new watermark when it moved and should be persisted.
    pub fn confirm(&mut self, track: &Track) -> Option<Watermark> {
        if self.blocked {
            return None;
        }

        let current = self.watermark.unwrap_or_default();
        let next = current.advance_to(track.played_at);
        if self.watermark.is_some() && next == current {
            return None;
        }

        self.watermark = Some(next);
        Some(next)
    }

    /// Record that the track with output `final_path` failed.
    pub fn fail(&mut self, final_path: PathBuf) {
        self.blocked = true;
        self.failed.insert(final_path);
    }

    /// Watermark to carry into the next cycle.
    pub fn watermark(&self) -> Option<Watermark> {
        self.watermark
    }
}
