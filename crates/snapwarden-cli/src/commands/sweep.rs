//! Sweep command implementation.

use crate::cli::SweepArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use snapwarden_retention::{MutationLock, RetentionWorker, SweepOutcome};

/// Execute the sweep command.
pub async fn execute_sweep(args: SweepArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let outcome = sweep_once(config, args.dry_run).await?;
    println!("{}", formatter.format_outcome(&outcome)?);
    Ok(())
}

/// Run a single sweep with the configured threshold.
pub async fn sweep_once(config: &Config, dry_run: bool) -> Result<SweepOutcome> {
    let mut retention = config.retention_config()?;
    retention.dry_run |= dry_run;

    let worker = RetentionWorker::new(retention, MutationLock::new())?;
    Ok(worker.sweep_now().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn aged_image(dir: &std::path::Path, name: &str, age: Duration) -> std::path::PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
        path
    }

    fn config_for(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.cleanup.managed_dir = dir.to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_sweep_deletes_stale_images() {
        let tmp = TempDir::new().unwrap();
        let stale = aged_image(tmp.path(), "old.webp", Duration::from_secs(48 * 3600));
        let fresh = aged_image(tmp.path(), "new.webp", Duration::from_secs(60));

        let outcome = sweep_once(&config_for(tmp.path()), false).await.unwrap();

        assert_eq!(outcome.deleted, 1);
        assert!(!stale.exists());
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn test_dry_run_flag_keeps_files() {
        let tmp = TempDir::new().unwrap();
        let stale = aged_image(tmp.path(), "old.jpg", Duration::from_secs(48 * 3600));

        let outcome = sweep_once(&config_for(tmp.path()), true).await.unwrap();

        assert!(outcome.dry_run);
        assert_eq!(outcome.candidates, 1);
        assert_eq!(outcome.deleted, 0);
        assert!(stale.exists());
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let config = config_for(&tmp.path().join("absent"));
        assert!(sweep_once(&config, false).await.is_err());
    }
}
