//! Per-sweep outcomes and cumulative metrics

use chrono::{DateTime, Local};
use serde::Serialize;

/// Counters for a single sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepOutcome {
    /// Eligible files found by the scan
    pub candidates: usize,
    /// Files removed, including ones that had already vanished
    pub deleted: usize,
    /// Files that could not be removed
    pub failed: usize,
    /// Candidates not attempted because the sweep was cancelled
    pub skipped: usize,
    /// Nothing was removed because dry-run is enabled
    pub dry_run: bool,
}

impl SweepOutcome {
    /// True if the sweep removed or failed on at least one file
    pub fn did_work(&self) -> bool {
        self.deleted > 0 || self.failed > 0
    }
}

/// Metrics accumulated across sweeps
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetentionMetrics {
    /// Sweeps that completed their scan
    pub sweep_count: usize,

    /// Sweeps aborted because the directory could not be read
    pub scan_failures: usize,

    /// Files deleted across all sweeps
    pub total_deleted: usize,

    /// Files that failed to delete across all sweeps
    pub total_failed: usize,

    /// Total time spent sweeping in milliseconds
    pub total_runtime_ms: u64,

    /// When the last sweep finished
    pub last_sweep_at: Option<DateTime<Local>>,
}

impl RetentionMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed sweep
    pub fn record_sweep(&mut self, outcome: &SweepOutcome, runtime_ms: u64) {
        self.sweep_count += 1;
        self.total_deleted += outcome.deleted;
        self.total_failed += outcome.failed;
        self.total_runtime_ms += runtime_ms;
        self.last_sweep_at = Some(Local::now());
    }

    /// Record a sweep aborted by a scan failure
    pub fn record_scan_failure(&mut self) {
        self.scan_failures += 1;
        self.last_sweep_at = Some(Local::now());
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let last = self
            .last_sweep_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());

        [
            "Retention Metrics Summary".to_string(),
            "=========================".to_string(),
            format!("Sweep cycles: {}", self.sweep_count),
            format!("Scan failures: {}", self.scan_failures),
            format!("Deleted: {}", self.total_deleted),
            format!("Failed: {}", self.total_failed),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            format!("Last sweep: {}", last),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = RetentionMetrics::new();
        assert_eq!(metrics.sweep_count, 0);
        assert_eq!(metrics.total_deleted, 0);
        assert!(metrics.last_sweep_at.is_none());
    }

    #[test]
    fn test_record_sweep() {
        let mut metrics = RetentionMetrics::new();
        let outcome = SweepOutcome {
            candidates: 5,
            deleted: 4,
            failed: 1,
            ..Default::default()
        };
        metrics.record_sweep(&outcome, 12);
        metrics.record_sweep(&outcome, 8);

        assert_eq!(metrics.sweep_count, 2);
        assert_eq!(metrics.total_deleted, 8);
        assert_eq!(metrics.total_failed, 2);
        assert_eq!(metrics.total_runtime_ms, 20);
        assert!(metrics.last_sweep_at.is_some());
    }

    #[test]
    fn test_scan_failure_is_not_a_sweep() {
        let mut metrics = RetentionMetrics::new();
        metrics.record_scan_failure();
        assert_eq!(metrics.sweep_count, 0);
        assert_eq!(metrics.scan_failures, 1);
    }

    #[test]
    fn test_reset() {
        let mut metrics = RetentionMetrics::new();
        metrics.record_sweep(&SweepOutcome::default(), 1);
        metrics.record_scan_failure();

        metrics.reset();

        assert_eq!(metrics.sweep_count, 0);
        assert_eq!(metrics.scan_failures, 0);
        assert!(metrics.last_sweep_at.is_none());
    }

    #[test]
    fn test_did_work() {
        assert!(!SweepOutcome::default().did_work());
        assert!(SweepOutcome { failed: 1, ..Default::default() }.did_work());
        assert!(!SweepOutcome { candidates: 3, dry_run: true, ..Default::default() }.did_work());
    }

    #[test]
    fn test_summary() {
        let mut metrics = RetentionMetrics::new();
        metrics.record_sweep(
            &SweepOutcome {
                deleted: 5,
                failed: 2,
                ..Default::default()
            },
            120,
        );

        let summary = metrics.summary();
        assert!(summary.contains("Sweep cycles: 1"));
        assert!(summary.contains("Deleted: 5"));
        assert!(summary.contains("Failed: 2"));
        assert!(summary.contains("Total runtime: 120ms"));
    }
}
