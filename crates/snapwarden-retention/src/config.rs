//! Configuration for retention operations
//!
//! Defines the managed directory, the max-age threshold and the sweep timing knobs.

use crate::{RetentionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Largest accepted value for [`AgeUnit::Minutes`]
pub const MAX_MINUTES: f64 = 60.0;

/// Largest accepted value for [`AgeUnit::Hours`] (365 days)
pub const MAX_HOURS: f64 = 525_600.0;

/// Unit a [`MaxAge`] value is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeUnit {
    /// Minutes (1 to 60)
    Minutes,
    /// Hours (1 to 525600)
    Hours,
}

impl AgeUnit {
    /// Number of seconds in one unit
    pub fn seconds(self) -> f64 {
        match self {
            AgeUnit::Minutes => 60.0,
            AgeUnit::Hours => 3600.0,
        }
    }

    fn bounds(self) -> (f64, f64) {
        match self {
            AgeUnit::Minutes => (1.0, MAX_MINUTES),
            AgeUnit::Hours => (1.0, MAX_HOURS),
        }
    }
}

impl fmt::Display for AgeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeUnit::Minutes => write!(f, "minutes"),
            AgeUnit::Hours => write!(f, "hours"),
        }
    }
}

/// Max-age threshold as entered by a user: a positive number with a unit
///
/// Files older than this are eligible for deletion. Validation happens here, in the
/// caller, so the worker only ever sees a positive [`Duration`].
///
/// # Examples
///
/// ```
/// use snapwarden_retention::{AgeUnit, MaxAge};
/// use std::time::Duration;
///
/// let age = MaxAge::new(2.5, AgeUnit::Hours);
/// assert_eq!(age.as_duration().unwrap(), Duration::from_secs(9000));
///
/// assert!(MaxAge::new(0.0, AgeUnit::Hours).validate().is_err());
/// assert!(MaxAge::new(90.0, AgeUnit::Minutes).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxAge {
    /// Numeric amount
    pub value: f64,
    /// Unit of `value`
    pub unit: AgeUnit,
}

impl MaxAge {
    /// Create a new threshold (unvalidated)
    pub fn new(value: f64, unit: AgeUnit) -> Self {
        Self { value, unit }
    }

    /// Check the value is finite, positive and inside the unit's range
    pub fn validate(&self) -> Result<()> {
        if !self.value.is_finite() || self.value <= 0.0 {
            return Err(RetentionError::InvalidThreshold(format!(
                "max age must be greater than zero (got {})",
                self.value
            )));
        }

        let (min, max) = self.unit.bounds();
        if self.value < min || self.value > max {
            return Err(RetentionError::InvalidThreshold(format!(
                "max age in {} must be between {} and {} (got {})",
                self.unit, min, max, self.value
            )));
        }

        Ok(())
    }

    /// Validate and convert to a [`Duration`]
    pub fn as_duration(&self) -> Result<Duration> {
        self.validate()?;
        Ok(Duration::from_secs_f64(self.value * self.unit.seconds()))
    }
}

impl Default for MaxAge {
    /// 24 hours
    fn default() -> Self {
        Self::new(24.0, AgeUnit::Hours)
    }
}

impl fmt::Display for MaxAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Configuration for a retention worker
///
/// # Examples
///
/// ```
/// use snapwarden_retention::RetentionConfig;
/// use std::time::Duration;
///
/// let config = RetentionConfig::new("captures");
/// assert_eq!(config.sweep_interval(), Duration::from_secs(600));
/// assert_eq!(config.retry_attempts, 3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Directory the producer writes captures into
    pub managed_dir: PathBuf,

    /// Files older than this are deleted
    #[serde(default)]
    pub max_age: MaxAge,

    /// Time between sweeps (in milliseconds)
    /// Default: 600000 (10 minutes)
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,

    /// Delete attempts per file before it is counted as failed
    /// Default: 3
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Pause between delete attempts (in milliseconds)
    /// Default: 1000
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// How long `stop()` waits for the loop to exit (in milliseconds)
    /// Default: 1000
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,

    /// Dry-run mode: Log what would be deleted without actually deleting
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,
}

fn default_sweep_interval_ms() -> u64 {
    600_000
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_shutdown_timeout_ms() -> u64 {
    1000
}

impl RetentionConfig {
    /// Default configuration for the given managed directory
    pub fn new(managed_dir: impl Into<PathBuf>) -> Self {
        Self {
            managed_dir: managed_dir.into(),
            max_age: MaxAge::default(),
            sweep_interval_ms: default_sweep_interval_ms(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            dry_run: false,
        }
    }

    /// Check every field is usable by a worker
    pub fn validate(&self) -> Result<()> {
        if self.managed_dir.as_os_str().is_empty() {
            return Err(RetentionError::Config("managed_dir must not be empty".into()));
        }
        if self.sweep_interval_ms == 0 {
            return Err(RetentionError::Config(
                "sweep_interval_ms must be greater than zero".into(),
            ));
        }
        if self.retry_attempts == 0 {
            return Err(RetentionError::Config(
                "retry_attempts must be at least 1".into(),
            ));
        }
        self.max_age.validate()
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Get retry delay as Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RetentionConfig::new("/tmp/captures");
        assert_eq!(config.managed_dir, PathBuf::from("/tmp/captures"));
        assert_eq!(config.max_age, MaxAge::new(24.0, AgeUnit::Hours));
        assert_eq!(config.sweep_interval_ms, 600_000);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay_ms, 1000);
        assert_eq!(config.shutdown_timeout_ms, 1000);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_duration_conversions() {
        let config = RetentionConfig::new("captures");

        assert_eq!(config.sweep_interval(), Duration::from_secs(600));
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(1));
        assert_eq!(
            config.max_age.as_duration().unwrap(),
            Duration::from_secs(24 * 3600)
        );
    }

    #[test]
    fn test_max_age_units() {
        assert_eq!(
            MaxAge::new(30.0, AgeUnit::Minutes).as_duration().unwrap(),
            Duration::from_secs(1800)
        );
        assert_eq!(
            MaxAge::new(1.5, AgeUnit::Hours).as_duration().unwrap(),
            Duration::from_secs(5400)
        );
    }

    #[test]
    fn test_max_age_rejects_non_positive() {
        assert!(MaxAge::new(0.0, AgeUnit::Hours).validate().is_err());
        assert!(MaxAge::new(-3.0, AgeUnit::Minutes).validate().is_err());
        assert!(MaxAge::new(f64::NAN, AgeUnit::Hours).validate().is_err());
        assert!(MaxAge::new(f64::INFINITY, AgeUnit::Hours).validate().is_err());
    }

    #[test]
    fn test_max_age_unit_ranges() {
        assert!(MaxAge::new(1.0, AgeUnit::Minutes).validate().is_ok());
        assert!(MaxAge::new(60.0, AgeUnit::Minutes).validate().is_ok());
        assert!(MaxAge::new(61.0, AgeUnit::Minutes).validate().is_err());
        assert!(MaxAge::new(0.5, AgeUnit::Minutes).validate().is_err());

        assert!(MaxAge::new(525_600.0, AgeUnit::Hours).validate().is_ok());
        assert!(MaxAge::new(525_601.0, AgeUnit::Hours).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_timing() {
        let mut config = RetentionConfig::new("captures");
        config.sweep_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = RetentionConfig::new("captures");
        config.retry_attempts = 0;
        assert!(config.validate().is_err());

        let config = RetentionConfig::new("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_age_display() {
        assert_eq!(MaxAge::new(24.0, AgeUnit::Hours).to_string(), "24 hours");
        assert_eq!(MaxAge::new(2.5, AgeUnit::Minutes).to_string(), "2.5 minutes");
    }

    #[test]
    fn test_parse_toml_with_defaults() {
        let toml = r#"
            managed_dir = "/srv/captures"

            [max_age]
            value = 90.0
            unit = "minutes"
        "#;

        let config: RetentionConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.managed_dir, PathBuf::from("/srv/captures"));
        assert_eq!(config.max_age.unit, AgeUnit::Minutes);
        assert_eq!(config.sweep_interval_ms, 600_000);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = RetentionConfig::new("captures");
        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: RetentionConfig = serde_json::from_str(&serialized).unwrap();

        assert_eq!(config.managed_dir, deserialized.managed_dir);
        assert_eq!(config.max_age, deserialized.max_age);
        assert_eq!(config.dry_run, deserialized.dry_run);
    }
}
