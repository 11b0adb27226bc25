//! Producer-side helper for writing captures into the managed directory

use crate::{MutationLock, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Encoded format of a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG (`.jpg`)
    Jpeg,
    /// WebP (`.webp`)
    Webp,
}

impl ImageFormat {
    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Webp => "webp",
        }
    }
}

/// File name for a capture taken at `at`: `screenshot_YYYYmmdd_HHMMSS_mmm.<ext>`
pub fn capture_file_name(at: DateTime<Local>, format: ImageFormat) -> String {
    format!(
        "screenshot_{}.{}",
        at.format("%Y%m%d_%H%M%S_%3f"),
        format.extension()
    )
}

/// Writes encoded captures into the managed directory under the [`MutationLock`]
///
/// Hand the same lock to the retention worker so a write never races a sweep.
///
/// # Examples
///
/// ```no_run
/// use snapwarden_retention::{CaptureWriter, ImageFormat, MutationLock};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let lock = MutationLock::new();
/// let writer = CaptureWriter::new("captures", lock.clone());
///
/// let encoded: Vec<u8> = Vec::new(); // bytes from the image encoder
/// let path = writer.write(ImageFormat::Jpeg, &encoded).await?;
/// println!("saved {}", path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CaptureWriter {
    dir: PathBuf,
    lock: MutationLock,
}

impl CaptureWriter {
    /// Create a writer for `dir`
    pub fn new(dir: impl Into<PathBuf>, lock: MutationLock) -> Self {
        Self {
            dir: dir.into(),
            lock,
        }
    }

    /// The managed directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one capture named after the current local time
    pub async fn write(&self, format: ImageFormat, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(capture_file_name(Local::now(), format));
        self.write_to(&path, bytes).await?;
        Ok(path)
    }

    /// Write `bytes` to `path` while holding the lock, creating the directory if needed
    pub async fn write_to(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let _guard = self.lock.acquire().await;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(path, bytes).await?;
        tracing::trace!("Wrote capture {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_capture_file_name() {
        let at = Local
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(
            capture_file_name(at, ImageFormat::Jpeg),
            "screenshot_20240309_140507_042.jpg"
        );
        assert_eq!(
            capture_file_name(at, ImageFormat::Webp),
            "screenshot_20240309_140507_042.webp"
        );
    }

    #[tokio::test]
    async fn test_write_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let writer = CaptureWriter::new(tmp.path().join("captures"), MutationLock::new());

        let path = writer.write(ImageFormat::Webp, b"img").await.unwrap();

        assert!(path.starts_with(writer.dir()));
        assert_eq!(path.extension().unwrap(), "webp");
        assert_eq!(std::fs::read(&path).unwrap(), b"img");
    }

    #[tokio::test]
    async fn test_write_waits_for_lock() {
        let tmp = TempDir::new().unwrap();
        let lock = MutationLock::new();
        let writer = CaptureWriter::new(tmp.path(), lock.clone());

        let guard = lock.acquire().await;
        let pending = tokio::spawn(async move { writer.write(ImageFormat::Jpeg, b"x").await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!pending.is_finished());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);

        drop(guard);
        let path = pending.await.unwrap().unwrap();
        assert!(path.exists());
    }
}
