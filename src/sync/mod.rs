//! Poll cycle orchestration and progress tracking.
//!
//! # Architecture
//!
//! - **Watermark** (`watermark.rs`) - persisted progress marker
//! - **Tracker** (`tracker.rs`) - per-cycle dedup and contiguous advance
//! - **Poller** (`poller.rs`) - feed → resolve → acquire, and the sleep loop
//!
//! The watermark is passed into each cycle and returned in its report; the
//! only process-wide state is what the [`WatermarkStore`] persists.
//!
//! [`WatermarkStore`]: crate::traits::WatermarkStore

pub mod poller;
pub mod tracker;
pub mod watermark;

pub use poller::{CycleReport, Poller};
pub use tracker::{CycleTracker, Decision};
pub use watermark::{FileWatermarkStore, WATERMARK_FILE, WatermarkError};
