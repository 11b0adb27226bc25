//! Directory enumeration and eligibility selection

use crate::{RetentionError, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Extensions (lowercase, without the dot) the sweeper is allowed to delete
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

/// A file selected for deletion by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Full path of the file
    pub path: PathBuf,
    /// Last modification time observed during the scan
    pub modified: SystemTime,
    /// Lowercased extension
    pub extension: String,
}

/// Lowercased image extension of `path`, if it has one we manage
pub fn image_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// An image entry whose metadata could not be read
#[derive(Debug)]
pub struct UnreadableEntry {
    /// Full path of the entry
    pub path: PathBuf,
    /// The stat error
    pub error: io::Error,
}

/// Result of one directory scan
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Image files that passed the age filter
    pub candidates: Vec<CandidateFile>,
    /// Image entries that could not be inspected; their age is unknown
    pub unreadable: Vec<UnreadableEntry>,
}

/// Scans the top level of the managed directory
///
/// Only regular files directly inside the directory are considered. Subdirectories
/// and non-image files are skipped. Symlinks are followed, as with `stat`.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    dir: PathBuf,
}

impl DirectoryScanner {
    /// Create a scanner for `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The managed directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Image files modified strictly before `cutoff`, in enumeration order
    ///
    /// Fails with [`RetentionError::DirectoryScan`] if the directory cannot be
    /// enumerated. Entries that vanish mid-scan are skipped; entries that exist but
    /// cannot be inspected are returned in [`ScanReport::unreadable`].
    pub async fn scan(&self, cutoff: SystemTime) -> Result<ScanReport> {
        let mut report = self.inspect_all().await?;
        report.candidates.retain(|file| file.modified < cutoff);
        Ok(report)
    }

    /// Every readable image file in the directory regardless of age
    pub async fn image_files(&self) -> Result<Vec<CandidateFile>> {
        let report = self.inspect_all().await?;
        for entry in &report.unreadable {
            tracing::debug!("Cannot inspect {}: {}", entry.path.display(), entry.error);
        }
        Ok(report.candidates)
    }

    async fn inspect_all(&self) -> Result<ScanReport> {
        let scan_error = |source| RetentionError::DirectoryScan {
            path: self.dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(scan_error)?;
        let mut report = ScanReport::default();

        while let Some(entry) = entries.next_entry().await.map_err(scan_error)? {
            let path = entry.path();

            let Some(extension) = image_extension(&path) else {
                tracing::trace!("Skipping non-image entry {}", path.display());
                continue;
            };

            let stat = tokio::fs::metadata(&path)
                .await
                .and_then(|metadata| Ok((metadata.is_file(), metadata.modified()?)));

            match stat {
                Ok((true, modified)) => report.candidates.push(CandidateFile {
                    path,
                    modified,
                    extension,
                }),
                Ok((false, _)) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!("Skipping {}: vanished during scan", path.display());
                }
                Err(error) => report.unreadable.push(UnreadableEntry { path, error }),
            }
        }

        Ok(report)
    }
}

/// Total size in bytes of every file under `dir`, recursively
///
/// Unreadable subdirectories and entries that vanish mid-walk are ignored. Only a
/// failure to read `dir` itself is reported.
pub async fn folder_size(dir: &Path) -> Result<u64> {
    let mut total = 0u64;
    let mut pending = vec![dir.to_path_buf()];
    let mut is_root = true;

    while let Some(current) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&current).await {
            Ok(entries) => entries,
            Err(source) if is_root => {
                return Err(RetentionError::DirectoryScan {
                    path: current,
                    source,
                })
            }
            Err(e) => {
                tracing::debug!("Skipping unreadable directory {}: {}", current.display(), e);
                continue;
            }
        };
        is_root = false;

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!("Stopped reading {}: {}", current.display(), e);
                    break;
                }
            };
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                if let Ok(metadata) = entry.metadata().await {
                    total += metadata.len();
                }
            }
        }
    }

    Ok(total)
}
