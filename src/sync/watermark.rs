//! File-backed watermark persistence.
//!
//! The value is the Unix timestamp of the last confirmed play, stored as
//! decimal text. Writes go to a sibling temp file which is then renamed over
//! the real one, so a crash mid-write leaves the previous value intact.

use std::io;
use std::path::{Path, PathBuf};

use crate::model::Watermark;
use crate::traits::WatermarkStore;

/// File name inside the app-state directory.
pub const WATERMARK_FILE: &str = "last_downloaded_timestamp.txt";

/// Errors reading or writing the watermark
#[derive(Debug, thiserror::Error)]
pub enum WatermarkError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unreadable watermark in {path:?}: {content:?}")]
    Corrupt { path: PathBuf, content: String },
}

/// Watermark stored as a text file
#[derive(Debug, Clone)]
pub struct FileWatermarkStore {
    path: PathBuf,
}

impl FileWatermarkStore {
    /// Store at `<dir>/last_downloaded_timestamp.txt`.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(WATERMARK_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl WatermarkStore for FileWatermarkStore {
    fn load(&self) -> Result<Option<Watermark>, WatermarkError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(WatermarkError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        trimmed
            .parse::<i64>()
            .map(|v| Some(Watermark(v)))
            .map_err(|_| WatermarkError::Corrupt {
                path: self.path.clone(),
                content: trimmed.chars().take(64).collect(),
            })
    }

    fn save(&self, watermark: Watermark) -> Result<(), WatermarkError> {
        let write_err = |source| WatermarkError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let temp = self.temp_path();
        std::fs::write(&temp, watermark.value().to_string()).map_err(write_err)?;
        std::fs::rename(&temp, &self.path).map_err(write_err)?;

        tracing::debug!("Watermark saved: {}", watermark);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWatermarkStore::new(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWatermarkStore::new(&dir.path().join("state"));

        store.save(Watermark(1000)).unwrap();

        assert_eq!(store.load().unwrap(), Some(Watermark(1000)));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("state").join(WATERMARK_FILE)).unwrap(),
            "1000"
        );
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_reads_value_with_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(WATERMARK_FILE), "1700000000\n").unwrap();
        let store = FileWatermarkStore::new(dir.path());
        assert_eq!(store.load().unwrap(), Some(Watermark(1_700_000_000)));
    }

    #[test]
    fn test_empty_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(WATERMARK_FILE), "  \n").unwrap();
        let store = FileWatermarkStore::new(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(WATERMARK_FILE), "yesterday").unwrap();
        let store = FileWatermarkStore::new(dir.path());
        assert!(matches!(store.load(), Err(WatermarkError::Corrupt { .. })));
    }
}
