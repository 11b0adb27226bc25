//! Snapwarden Retention
//!
//! Background cleanup engine for a directory of periodically captured screenshots.
//!
//! # Overview
//!
//! A capture producer keeps writing image files into a managed directory. The
//! retention worker runs beside it and, on a fixed interval, deletes image files
//! whose modification time is older than a configurable threshold:
//!
//! - **Scheduling**: one background task per worker; the interval wait is cut short
//!   by cancellation, so `stop()` returns promptly
//! - **Exclusion**: producer writes and sweeps share a [`MutationLock`] and never run
//!   concurrently
//! - **Resilience**: locked or permission-denied files are retried a few times, and
//!   one stuck file never aborts a sweep
//! - **Reconfiguration**: the threshold can be changed while the worker runs
//!
//! # Sweep Lifecycle
//!
//! | Phase | What happens | Cancellation checkpoint |
//! |-------|--------------|-------------------------|
//! | Wait | Sleep for the sweep interval (default 10 minutes) | Yes |
//! | Lock | Acquire the [`MutationLock`] | No |
//! | Scan | List top-level image files older than `now - max_age` | No |
//! | Delete | Remove candidates one at a time, up to 3 attempts each | Between files and retries |
//! | Report | Log `deleted=N failed=M` or a quiet "nothing to delete" | No |
//!
//! # Usage
//!
//! ## One-time Sweep
//!
//! ```no_run
//! use snapwarden_retention::{MutationLock, RetentionConfig, RetentionWorker};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let worker = RetentionWorker::new(RetentionConfig::new("captures"), MutationLock::new())?;
//!
//! let outcome = worker.sweep_now().await?;
//! println!("deleted={} failed={}", outcome.deleted, outcome.failed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Background Worker With a Producer
//!
//! ```no_run
//! use snapwarden_retention::{
//!     AgeUnit, CaptureWriter, ImageFormat, MaxAge, MutationLock, RetentionConfig, RetentionWorker,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let lock = MutationLock::new();
//!     let mut config = RetentionConfig::new("captures");
//!     config.max_age = MaxAge::new(12.0, AgeUnit::Hours);
//!
//!     let mut worker = RetentionWorker::new(config, lock.clone())?;
//!     let writer = CaptureWriter::new("captures", lock);
//!
//!     worker.start();
//!     writer.write(ImageFormat::Webp, &[]).await?;
//!
//!     // Later, from a settings change
//!     worker.update_threshold(MaxAge::new(30.0, AgeUnit::Minutes).as_duration()?);
//!
//!     worker.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! [`RetentionConfig`] can be loaded from TOML:
//!
//! ```toml
//! managed_dir = "captures"
//! sweep_interval_ms = 600000
//! retry_attempts = 3
//! retry_delay_ms = 1000
//! shutdown_timeout_ms = 1000
//! dry_run = false
//!
//! [max_age]
//! value = 24.0
//! unit = "hours"
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod executor;
mod lock;
mod metrics;
mod policy;
mod producer;
mod scanner;
mod sweeper;
mod worker;

pub use config::{AgeUnit, MaxAge, RetentionConfig, MAX_HOURS, MAX_MINUTES};
pub use error::{Result, RetentionError};
pub use executor::{classify, DeleteOutcome, DeletionExecutor, FailureKind, FileRemover, FsRemover};
pub use lock::{MutationGuard, MutationLock};
pub use metrics::{RetentionMetrics, SweepOutcome};
pub use policy::{format_age, RetentionPolicy};
pub use producer::{capture_file_name, CaptureWriter, ImageFormat};
pub use scanner::{
    folder_size, image_extension, CandidateFile, DirectoryScanner, ScanReport, UnreadableEntry,
    IMAGE_EXTENSIONS,
};
pub use sweeper::Sweeper;
pub use worker::{RetentionWorker, WorkerState};
