//! One scan-and-delete cycle over the managed directory

use crate::executor::{DeleteOutcome, DeletionExecutor, FileRemover, FsRemover};
use crate::policy::{format_age, RetentionPolicy};
use crate::scanner::DirectoryScanner;
use crate::{MutationLock, Result, RetentionMetrics, SweepOutcome};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Instant, SystemTime};
use tokio_util::sync::CancellationToken;

/// Runs sweeps: scan for eligible files, then delete them one at a time
///
/// The whole sweep runs under the [`MutationLock`], so a producer write never
/// interleaves with a scan or a deletion. The threshold is read once per sweep,
/// after the lock is taken.
pub struct Sweeper<R = FsRemover> {
    scanner: DirectoryScanner,
    executor: DeletionExecutor<R>,
    lock: MutationLock,
    policy: Arc<RetentionPolicy>,
    dry_run: bool,
    metrics: Mutex<RetentionMetrics>,
}

impl<R: FileRemover> Sweeper<R> {
    /// Create a sweeper
    pub fn new(
        scanner: DirectoryScanner,
        executor: DeletionExecutor<R>,
        lock: MutationLock,
        policy: Arc<RetentionPolicy>,
        dry_run: bool,
    ) -> Self {
        Self {
            scanner,
            executor,
            lock,
            policy,
            dry_run,
            metrics: Mutex::new(RetentionMetrics::new()),
        }
    }

    /// The managed directory
    pub fn dir(&self) -> &Path {
        self.scanner.dir()
    }

    /// The policy this sweeper reads its threshold from
    pub fn policy(&self) -> &Arc<RetentionPolicy> {
        &self.policy
    }

    /// Snapshot of the cumulative metrics
    pub fn metrics(&self) -> RetentionMetrics {
        self.metrics_mut().clone()
    }

    /// Reset metrics counters
    pub fn reset_metrics(&self) {
        self.metrics_mut().reset();
    }

    fn metrics_mut(&self) -> MutexGuard<'_, RetentionMetrics> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Perform one sweep
    ///
    /// Fails only if the directory cannot be enumerated, in which case no file is
    /// touched. Per-file failures, including image entries that cannot be
    /// inspected, are counted in the outcome and never abort the sweep.
    /// If `cancel` fires, the remaining candidates are counted as skipped.
    pub async fn sweep(&self, cancel: &CancellationToken) -> Result<SweepOutcome> {
        let started = Instant::now();
        let _guard = self.lock.acquire().await;

        let max_age = self.policy.max_age();
        let cutoff = RetentionPolicy::cutoff(max_age, SystemTime::now());
        tracing::debug!(
            "Sweep started: scanning {} for images older than {}",
            self.dir().display(),
            format_age(max_age)
        );

        let report = match self.scanner.scan(cutoff).await {
            Ok(report) => report,
            Err(e) => {
                self.metrics_mut().record_scan_failure();
                return Err(e);
            }
        };

        for entry in &report.unreadable {
            tracing::warn!("Cannot inspect {}: {}", entry.path.display(), entry.error);
        }

        let candidates = report.candidates;
        let mut outcome = SweepOutcome {
            candidates: candidates.len(),
            failed: report.unreadable.len(),
            dry_run: self.dry_run,
            ..Default::default()
        };

        for (index, candidate) in candidates.iter().enumerate() {
            if cancel.is_cancelled() {
                outcome.skipped = candidates.len() - index;
                break;
            }

            if self.dry_run {
                tracing::info!("DRY RUN: Would delete {}", candidate.path.display());
                continue;
            }

            match self.executor.delete(&candidate.path, cancel).await {
                DeleteOutcome::Deleted { .. } => {
                    outcome.deleted += 1;
                    tracing::debug!("Deleted {}", candidate.path.display());
                }
                DeleteOutcome::AlreadyGone => outcome.deleted += 1,
                DeleteOutcome::Failed { .. } => outcome.failed += 1,
                DeleteOutcome::Cancelled => {
                    outcome.skipped = candidates.len() - index;
                    break;
                }
            }
        }

        let runtime_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.metrics_mut().record_sweep(&outcome, runtime_ms);
        log_outcome(&outcome);

        Ok(outcome)
    }
}

fn log_outcome(outcome: &SweepOutcome) {
    if outcome.did_work() {
        tracing::info!(
            deleted = outcome.deleted,
            failed = outcome.failed,
            "Sweep completed: deleted={} failed={}",
            outcome.deleted,
            outcome.failed
        );
    } else if outcome.dry_run && outcome.candidates > 0 {
        tracing::info!(
            "DRY RUN: Sweep completed, {} file(s) eligible",
            outcome.candidates
        );
    } else {
        tracing::debug!("Sweep completed: nothing to delete");
    }

    if outcome.skipped > 0 {
        tracing::info!(
            "Sweep interrupted: {} eligible file(s) left for the next sweep",
            outcome.skipped
        );
    }
}
