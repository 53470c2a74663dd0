//! Static placeholder detection.
//!
//! Some video backends fall back to serving a still thumbnail looped over the
//! audio. Such a file plays, but it is not a video. We sample one frame per
//! second over the first seconds and call the file static when every sample
//! is byte-identical to the first.
//!
//! Detection fails open: if any frame cannot be decoded the file is kept.

use std::path::Path;
use std::time::Duration;

use crate::traits::MediaTool;

/// Number of frames sampled, one per second from t=0.
pub const SAMPLE_COUNT: u64 = 5;

/// Whether the file at `path` shows a single still image.
pub async fn is_static_placeholder(tool: &dyn MediaTool, path: &Path) -> bool {
    let mut first: Option<Vec<u8>> = None;

    for second in 0..SAMPLE_COUNT {
        let offset = Duration::from_secs(second);
        let frame = match tool.extract_frame(path, offset).await {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(
                    "Frame sampling failed for {:?} at {}s, assuming real video: {}",
                    path,
                    second,
                    e
                );
                return false;
            }
        };

        match &first {
            None => first = Some(frame),
            Some(reference) if *reference != frame => {
                tracing::debug!("{:?} changes at {}s", path, second);
                return false;
            }
            Some(_) => {}
        }
    }

    tracing::warn!(
        "{:?}: all {} sampled frames are identical",
        path,
        SAMPLE_COUNT
    );
    true
}
