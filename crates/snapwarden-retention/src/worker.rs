//! Background worker for continuous retention sweeps

use crate::executor::{DeletionExecutor, FileRemover, FsRemover};
use crate::policy::{format_age, RetentionPolicy};
use crate::scanner::DirectoryScanner;
use crate::sweeper::Sweeper;
use crate::{MutationLock, Result, RetentionConfig, RetentionError, RetentionMetrics, SweepOutcome};
use chrono::{DateTime, Local};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Lifecycle state of a [`RetentionWorker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// No background loop (initial state)
    Stopped,
    /// Background loop spawned and not yet asked to stop
    Running,
}

struct RunningLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// When the loop will run its next sweep; empty while stopped
#[derive(Debug, Clone, Default)]
struct Schedule {
    next: Arc<Mutex<Option<DateTime<Local>>>>,
}

impl Schedule {
    fn get(&self) -> Option<DateTime<Local>> {
        *self.next.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, at: Option<DateTime<Local>>) {
        *self.next.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    /// Record a sweep due `interval` from now
    fn arm(&self, interval: Duration) -> Option<DateTime<Local>> {
        let at = chrono::Duration::from_std(interval)
            .ok()
            .and_then(|delay| Local::now().checked_add_signed(delay));
        self.set(at);
        at
    }
}

/// Background worker that sweeps the managed directory on a schedule
///
/// The surrounding application drives it through [`start`](Self::start),
/// [`stop`](Self::stop) and [`update_threshold`](Self::update_threshold). None of
/// them return errors: outcomes are reported through `tracing`.
///
/// # Examples
///
/// ```no_run
/// use snapwarden_retention::{MutationLock, RetentionConfig, RetentionWorker};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let lock = MutationLock::new();
///     let config = RetentionConfig::new("captures");
///     let mut worker = RetentionWorker::new(config, lock.clone())?;
///
///     worker.start();
///     worker.update_threshold(Duration::from_secs(6 * 3600));
///
///     tokio::signal::ctrl_c().await?;
///     worker.stop().await;
///     Ok(())
/// }
/// ```
pub struct RetentionWorker<R = FsRemover> {
    sweeper: Arc<Sweeper<R>>,
    policy: Arc<RetentionPolicy>,
    shutdown_timeout: Duration,
    schedule: Schedule,
    running: Option<RunningLoop>,
}

impl RetentionWorker<FsRemover> {
    /// Create a stopped worker that deletes from the local filesystem
    pub fn new(config: RetentionConfig, lock: MutationLock) -> Result<Self> {
        Self::with_remover(config, lock, FsRemover)
    }
}

impl<R: FileRemover> RetentionWorker<R> {
    /// Create a stopped worker with a custom [`FileRemover`]
    pub fn with_remover(config: RetentionConfig, lock: MutationLock, remover: R) -> Result<Self> {
        config.validate()?;
        let policy = Arc::new(RetentionPolicy::new(
            config.sweep_interval(),
            config.max_age.as_duration()?,
        )?);

        let sweeper = Sweeper::new(
            DirectoryScanner::new(&config.managed_dir),
            DeletionExecutor::new(remover, config.retry_attempts, config.retry_delay()),
            lock,
            Arc::clone(&policy),
            config.dry_run,
        );

        Ok(Self {
            sweeper: Arc::new(sweeper),
            policy,
            shutdown_timeout: config.shutdown_timeout(),
            schedule: Schedule::default(),
            running: None,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        if self.running.is_some() {
            WorkerState::Running
        } else {
            WorkerState::Stopped
        }
    }

    /// True while the worker is [`WorkerState::Running`]
    pub fn is_running(&self) -> bool {
        self.state() == WorkerState::Running
    }

    /// The managed directory
    pub fn managed_dir(&self) -> &Path {
        self.sweeper.dir()
    }

    /// Current max-age threshold
    pub fn max_age(&self) -> Duration {
        self.policy.max_age()
    }

    /// Time between sweeps
    pub fn sweep_interval(&self) -> Duration {
        self.policy.sweep_interval()
    }

    /// Start the background loop
    ///
    /// No-op while running. Must be called from within a tokio runtime; otherwise
    /// the failure is logged and the worker stays stopped.
    pub fn start(&mut self) {
        if self.running.is_some() {
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::error!("Cannot start retention worker outside a tokio runtime: {}", e);
                return;
            }
        };

        let cancel = CancellationToken::new();
        self.schedule.arm(self.policy.sweep_interval());
        let handle = runtime.spawn(run_loop(
            Arc::clone(&self.sweeper),
            self.schedule.clone(),
            cancel.clone(),
        ));
        self.running = Some(RunningLoop { cancel, handle });

        tracing::info!(
            "Retention worker started (every {:?}, deleting images older than {})",
            self.policy.sweep_interval(),
            format_age(self.policy.max_age())
        );
    }

    /// Stop the background loop
    ///
    /// No-op while stopped. Waits up to the configured shutdown timeout for the loop
    /// to exit; if it does not, logs a warning and returns anyway. A sweep past its
    /// last cancellation checkpoint is left to finish on its own.
    pub async fn stop(&mut self) {
        let Some(RunningLoop { cancel, handle }) = self.running.take() else {
            return;
        };

        cancel.cancel();
        self.schedule.set(None);

        match tokio::time::timeout(self.shutdown_timeout, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Retention worker ended abnormally: {}", e),
            Err(_) => tracing::warn!(
                "Retention worker did not exit within {:?}",
                self.shutdown_timeout
            ),
        }

        tracing::info!("Retention worker stopped");
    }

    /// Replace the max-age threshold
    ///
    /// Applies from the next sweep at the latest and never interrupts a sweep or
    /// the interval wait in progress. A zero threshold is logged and ignored.
    pub fn update_threshold(&self, max_age: Duration) {
        match self.policy.set_max_age(max_age) {
            Ok(()) => tracing::info!("Retention threshold updated to {}", format_age(max_age)),
            Err(e) => tracing::warn!("Ignoring threshold update: {}", e),
        }
    }

    /// When the background loop will start its next sweep
    ///
    /// `None` while stopped. A time in the past means a sweep is in progress.
    pub fn next_sweep_at(&self) -> Option<DateTime<Local>> {
        self.schedule.get()
    }

    /// Time left until the next scheduled sweep, zero while one is running
    pub fn time_until_next_sweep(&self) -> Option<Duration> {
        self.next_sweep_at()
            .map(|at| (at - Local::now()).to_std().unwrap_or(Duration::ZERO))
    }

    /// Run one sweep now, independently of the background loop
    ///
    /// Shares the lock with the loop, so it never overlaps a scheduled sweep.
    pub async fn sweep_now(&self) -> Result<SweepOutcome> {
        self.sweeper.sweep(&CancellationToken::new()).await
    }

    /// Snapshot of the cumulative metrics
    pub fn metrics(&self) -> RetentionMetrics {
        self.sweeper.metrics()
    }

    /// Reset the cumulative metrics
    pub fn reset_metrics(&self) {
        self.sweeper.reset_metrics();
    }
}

impl<R> Drop for RetentionWorker<R> {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
        }
    }
}

async fn run_loop<R: FileRemover>(
    sweeper: Arc<Sweeper<R>>,
    schedule: Schedule,
    cancel: CancellationToken,
) {
    let interval = sweeper.policy().sweep_interval();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }

        // Isolate the sweep in its own task so a panic is reported, not fatal
        let task = {
            let sweeper = Arc::clone(&sweeper);
            let cancel = cancel.clone();
            tokio::spawn(async move { sweeper.sweep(&cancel).await })
        };

        let result = task
            .await
            .unwrap_or_else(|e| Err(RetentionError::Worker(format!("sweep task failed: {}", e))));

        if let Err(e) = result {
            tracing::error!("Sweep failed: {}", e);
        }

        if cancel.is_cancelled() {
            break;
        }
        if let Some(at) = schedule.arm(interval) {
            tracing::debug!("Next sweep at {}", at.format("%H:%M:%S"));
        }
    }

    tracing::debug!("Retention loop exited");
}
