//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use snapwarden_retention::{MaxAge, RetentionConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Automatic cleanup of old captures
    #[serde(default)]
    pub cleanup: CleanupSettings,

    /// Log output
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Cleanup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupSettings {
    /// Run the retention worker at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory captures are written into
    #[serde(default = "default_managed_dir")]
    pub managed_dir: PathBuf,

    /// Log eligible files instead of deleting them
    #[serde(default)]
    pub dry_run: bool,

    /// Delete captures older than this
    #[serde(default)]
    pub max_age: MaxAge,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Also write logs to a daily file
    #[serde(default = "default_true")]
    pub file: bool,

    /// Directory holding the daily log files
    #[serde(default = "default_log_dir")]
    pub directory: PathBuf,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".snapwarden").join("config.toml"))
    }

    /// Resolve an explicit path or fall back to the default one.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Load configuration from file, or defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Build the retention worker configuration.
    ///
    /// The sweep interval and retry timings keep their fixed defaults.
    pub fn retention_config(&self) -> Result<RetentionConfig> {
        self.cleanup.max_age.validate()?;

        let mut config = RetentionConfig::new(&self.cleanup.managed_dir);
        config.max_age = self.cleanup.max_age;
        config.dry_run = self.cleanup.dry_run;
        config.validate()?;
        Ok(config)
    }
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            managed_dir: default_managed_dir(),
            dry_run: false,
            max_age: MaxAge::default(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: true,
            directory: default_log_dir(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_managed_dir() -> PathBuf {
    PathBuf::from("screenshots")
}

fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".snapwarden").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapwarden_retention::AgeUnit;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.cleanup.enabled);
        assert_eq!(config.cleanup.managed_dir, PathBuf::from("screenshots"));
        assert_eq!(config.cleanup.max_age, MaxAge::new(24.0, AgeUnit::Hours));
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file);
        assert!(config.logging.directory.ends_with("logs"));
        assert!(config.settings.color);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_from(&tmp.path().join("absent.toml")).unwrap();
        assert!(config.cleanup.enabled);
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.cleanup.managed_dir = PathBuf::from("/data/captures");
        config.cleanup.max_age = MaxAge::new(30.0, AgeUnit::Minutes);
        config.settings.format = OutputFormat::Json;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.cleanup.managed_dir, PathBuf::from("/data/captures"));
        assert_eq!(loaded.cleanup.max_age, MaxAge::new(30.0, AgeUnit::Minutes));
        assert_eq!(loaded.settings.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml = r#"
            [cleanup]
            managed_dir = "shots"

            [cleanup.max_age]
            value = 6.0
            unit = "hours"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cleanup.managed_dir, PathBuf::from("shots"));
        assert!(config.cleanup.enabled);
        assert!(!config.cleanup.dry_run);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_retention_config() {
        let mut config = Config::default();
        config.cleanup.max_age = MaxAge::new(2.0, AgeUnit::Hours);
        config.cleanup.dry_run = true;

        let retention = config.retention_config().unwrap();
        assert_eq!(retention.managed_dir, PathBuf::from("screenshots"));
        assert_eq!(retention.max_age.as_duration().unwrap(), Duration::from_secs(7200));
        assert_eq!(retention.sweep_interval(), Duration::from_secs(600));
        assert!(retention.dry_run);
    }

    #[test]
    fn test_retention_config_rejects_bad_threshold() {
        let mut config = Config::default();
        config.cleanup.max_age = MaxAge::new(0.0, AgeUnit::Hours);
        assert!(config.retention_config().is_err());
    }
}
