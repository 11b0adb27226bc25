//! Single-file deletion with bounded retry

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Filesystem removal seam
///
/// [`FsRemover`] is the real implementation; tests substitute one that simulates
/// locked or permission-denied files. Calls may block: the executor runs them on
/// the blocking thread pool.
pub trait FileRemover: Send + Sync + 'static {
    /// Remove the file at `path`
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Removes files from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl FileRemover for FsRemover {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// How a removal error is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The file is already gone; the desired end state holds
    NotFound,
    /// Locked by another process or a temporary permission problem; worth retrying
    Transient,
    /// Anything else; not retried
    Unexpected,
}

// Windows ERROR_SHARING_VIOLATION and ERROR_LOCK_VIOLATION
const WIN_SHARING_VIOLATION: i32 = 32;
const WIN_LOCK_VIOLATION: i32 = 33;

/// Classify a removal error
pub fn classify(error: &io::Error) -> FailureKind {
    match error.kind() {
        io::ErrorKind::NotFound => FailureKind::NotFound,
        io::ErrorKind::PermissionDenied
        | io::ErrorKind::ResourceBusy
        | io::ErrorKind::WouldBlock => FailureKind::Transient,
        _ if cfg!(windows)
            && matches!(
                error.raw_os_error(),
                Some(WIN_SHARING_VIOLATION | WIN_LOCK_VIOLATION)
            ) =>
        {
            FailureKind::Transient
        }
        _ => FailureKind::Unexpected,
    }
}

/// Result of trying to delete one file
#[derive(Debug)]
pub enum DeleteOutcome {
    /// Removed by this call
    Deleted {
        /// Attempts used, starting at 1
        attempts: u32,
    },
    /// Did not exist at attempt time; counts as success
    AlreadyGone,
    /// Retry budget exhausted or an unexpected error
    Failed {
        /// Attempts used
        attempts: u32,
        /// Classification of the last error
        kind: FailureKind,
        /// The last error
        error: io::Error,
    },
    /// Cancellation observed before the file could be removed
    Cancelled,
}

/// Deletes files one at a time, retrying transient failures
#[derive(Debug, Clone)]
pub struct DeletionExecutor<R = FsRemover> {
    remover: Arc<R>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl<R: FileRemover> DeletionExecutor<R> {
    /// Create an executor. `max_attempts` is clamped to at least 1.
    pub fn new(remover: R, max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            remover: Arc::new(remover),
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    /// Delete `path`, waiting `retry_delay` between transient failures
    ///
    /// Every wait is a cancellation checkpoint. Never returns an error: the outcome
    /// says what happened and the caller moves on to the next file.
    pub async fn delete(&self, path: &Path, cancel: &CancellationToken) -> DeleteOutcome {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match self.remove_once(path).await {
                Ok(()) => return DeleteOutcome::Deleted { attempts: attempt },
                Err(error) => error,
            };

            let kind = classify(&error);
            match kind {
                FailureKind::NotFound => return DeleteOutcome::AlreadyGone,
                FailureKind::Transient if attempt < self.max_attempts => {
                    tracing::debug!(
                        "Delete retry {}/{}: {} - {}",
                        attempt,
                        self.max_attempts,
                        path.display(),
                        error
                    );
                }
                _ => {
                    tracing::warn!(
                        "Failed to delete {} after {} attempt(s): {}",
                        path.display(),
                        attempt,
                        error
                    );
                    return DeleteOutcome::Failed {
                        attempts: attempt,
                        kind,
                        error,
                    };
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return DeleteOutcome::Cancelled,
                _ = tokio::time::sleep(self.retry_delay) => {}
            }
        }
    }

    /// One removal attempt, off the async worker threads
    async fn remove_once(&self, path: &Path) -> io::Result<()> {
        let remover = Arc::clone(&self.remover);
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || remover.remove_file(&path))
            .await
            .unwrap_or_else(|e| Err(io::Error::other(format!("removal task failed: {}", e))))
    }
}
