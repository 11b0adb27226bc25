//! Sweep timing and the live max-age threshold

use crate::{RetentionError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

/// Retention policy shared between the controller and the worker loop
///
/// The sweep interval is fixed at construction. The max-age threshold sits in an
/// atomic cell so the controller can replace it while a sweep is reading it; the
/// sweeper reads it exactly once per sweep.
#[derive(Debug)]
pub struct RetentionPolicy {
    sweep_interval: Duration,
    max_age_ms: AtomicU64,
}

impl RetentionPolicy {
    /// Create a policy. Both durations must be non-zero.
    pub fn new(sweep_interval: Duration, max_age: Duration) -> Result<Self> {
        if sweep_interval.is_zero() {
            return Err(RetentionError::Config(
                "sweep interval must be greater than zero".into(),
            ));
        }
        let max_age_ms = to_millis(max_age).ok_or_else(|| {
            RetentionError::InvalidThreshold("max age must be at least 1ms".into())
        })?;

        Ok(Self {
            sweep_interval,
            max_age_ms: AtomicU64::new(max_age_ms),
        })
    }

    /// Time between sweeps
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Current max-age threshold
    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms.load(Ordering::Acquire))
    }

    /// Replace the max-age threshold
    ///
    /// Rejects a threshold that rounds to zero and keeps the previous value.
    pub fn set_max_age(&self, max_age: Duration) -> Result<()> {
        let millis = to_millis(max_age).ok_or_else(|| {
            RetentionError::InvalidThreshold("max age must be at least 1ms".into())
        })?;
        self.max_age_ms.store(millis, Ordering::Release);
        Ok(())
    }

    /// Files last modified before this instant are eligible
    pub fn cutoff(max_age: Duration, now: SystemTime) -> SystemTime {
        now.checked_sub(max_age).unwrap_or(SystemTime::UNIX_EPOCH)
    }
}

fn to_millis(duration: Duration) -> Option<u64> {
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    (millis > 0).then_some(millis)
}

/// Human-readable threshold, e.g. `24.0h` or `30.0min`
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs_f64();
    if secs >= 3600.0 {
        format!("{:.1}h", secs / 3600.0)
    } else if secs >= 60.0 {
        format!("{:.1}min", secs / 60.0)
    } else {
        format!("{:.1}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_policy_creation() {
        let policy =
            RetentionPolicy::new(Duration::from_secs(600), Duration::from_secs(3600)).unwrap();
        assert_eq!(policy.sweep_interval(), Duration::from_secs(600));
        assert_eq!(policy.max_age(), Duration::from_secs(3600));
    }

    #[test]
    fn test_rejects_zero_durations() {
        assert!(RetentionPolicy::new(Duration::ZERO, Duration::from_secs(1)).is_err());
        assert!(RetentionPolicy::new(Duration::from_secs(1), Duration::ZERO).is_err());
        assert!(RetentionPolicy::new(Duration::from_secs(1), Duration::from_micros(10)).is_err());
    }

    #[test]
    fn test_set_max_age_keeps_previous_on_zero() {
        let policy =
            RetentionPolicy::new(Duration::from_secs(600), Duration::from_secs(3600)).unwrap();

        policy.set_max_age(Duration::from_secs(60)).unwrap();
        assert_eq!(policy.max_age(), Duration::from_secs(60));

        assert!(policy.set_max_age(Duration::ZERO).is_err());
        assert_eq!(policy.max_age(), Duration::from_secs(60));
    }

    #[test]
    fn test_concurrent_updates_never_tear() {
        let policy = Arc::new(
            RetentionPolicy::new(Duration::from_secs(600), Duration::from_secs(1)).unwrap(),
        );

        let writers: Vec<_> = (1..=4u64)
            .map(|n| {
                let policy = Arc::clone(&policy);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        policy.set_max_age(Duration::from_secs(n * 1000)).unwrap();
                    }
                })
            })
            .collect();

        for _ in 0..1000 {
            let secs = policy.max_age().as_secs();
            assert!(secs == 1 || (secs % 1000 == 0 && secs <= 4000));
        }

        for writer in writers {
            writer.join().unwrap();
        }
    }

    #[test]
    fn test_cutoff() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(10_000);
        assert_eq!(
            RetentionPolicy::cutoff(Duration::from_secs(3600), now),
            SystemTime::UNIX_EPOCH + Duration::from_secs(6400)
        );
        assert_eq!(
            RetentionPolicy::cutoff(Duration::from_secs(20_000), now),
            SystemTime::UNIX_EPOCH
        );
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::from_secs(24 * 3600)), "24.0h");
        assert_eq!(format_age(Duration::from_secs(5400)), "1.5h");
        assert_eq!(format_age(Duration::from_secs(1800)), "30.0min");
        assert_eq!(format_age(Duration::from_secs(5)), "5.0s");
    }
}
