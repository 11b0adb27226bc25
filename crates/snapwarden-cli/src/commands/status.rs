//! Status command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::{Formatter, StatusReport};
use snapwarden_retention::{folder_size, DirectoryScanner, RetentionPolicy};
use std::time::SystemTime;

/// Execute the status command.
pub async fn execute_status(config: &Config, formatter: &Formatter) -> Result<()> {
    if !config.cleanup.managed_dir.is_dir() {
        eprintln!(
            "{}",
            formatter.warning(&format!(
                "Managed directory {} does not exist yet",
                config.cleanup.managed_dir.display()
            ))
        );
    }

    let report = build_report(config).await?;
    println!("{}", formatter.format_status(&report)?);
    Ok(())
}

/// Collect file counts and size for the managed directory.
///
/// A directory that does not exist yet reports zero files.
pub async fn build_report(config: &Config) -> Result<StatusReport> {
    let dir = &config.cleanup.managed_dir;
    let max_age = config.cleanup.max_age.as_duration()?;

    let (image_files, eligible_files, folder_size_bytes) = if dir.is_dir() {
        let files = DirectoryScanner::new(dir).image_files().await?;
        let cutoff = RetentionPolicy::cutoff(max_age, SystemTime::now());
        let eligible = files.iter().filter(|f| f.modified < cutoff).count();
        (files.len(), eligible, folder_size(dir).await?)
    } else {
        (0, 0, 0)
    };

    Ok(StatusReport {
        managed_dir: dir.clone(),
        cleanup_enabled: config.cleanup.enabled,
        max_age: config.cleanup.max_age.to_string(),
        image_files,
        eligible_files,
        folder_size_bytes,
    })
}
