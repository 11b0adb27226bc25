//! Run command implementation.

use crate::config::{CleanupSettings, Config};
use crate::error::Result;
use crate::output::Formatter;
use snapwarden_retention::{MaxAge, MutationLock, RetentionWorker};
use std::path::Path;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// How often the config file is re-read for cleanup changes.
const RELOAD_INTERVAL: Duration = Duration::from_secs(5);

/// What a config reload asks of a running worker.
#[derive(Debug, Default, PartialEq)]
pub struct ReloadPlan {
    /// Start (`true`) or stop (`false`) the worker
    pub enable: Option<bool>,
    /// New threshold to apply
    pub max_age: Option<MaxAge>,
    /// Settings that only a restart picks up have changed
    pub restart_needed: bool,
}

/// Compare the active cleanup settings with freshly loaded ones.
pub fn plan_reload(current: &CleanupSettings, reloaded: &CleanupSettings) -> ReloadPlan {
    ReloadPlan {
        enable: (reloaded.enabled != current.enabled).then_some(reloaded.enabled),
        max_age: (reloaded.max_age != current.max_age).then_some(reloaded.max_age),
        restart_needed: reloaded.managed_dir != current.managed_dir
            || reloaded.dry_run != current.dry_run,
    }
}

/// Re-read the cleanup section of the config file.
///
/// Unreadable or unparsable files are logged and treated as unchanged.
pub fn reload_cleanup(config_path: &Path) -> Option<CleanupSettings> {
    match Config::load_from(config_path) {
        Ok(config) => Some(config.cleanup),
        Err(e) => {
            tracing::warn!("Failed to reload {}: {}", config_path.display(), e);
            None
        }
    }
}

/// Execute the run command.
///
/// Blocks until Ctrl+C, then stops the worker and prints its metrics. While
/// running, the config file is polled so threshold changes and the `enabled`
/// toggle take effect without a restart.
pub async fn execute_run(config_path: &Path, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut worker = RetentionWorker::new(config.retention_config()?, MutationLock::new())?;

    if config.cleanup.enabled {
        worker.start();
        println!(
            "{}",
            formatter.success(&format!(
                "Watching {} (deleting images older than {}). Press Ctrl+C to stop.",
                worker.managed_dir().display(),
                config.cleanup.max_age
            ))
        );
        print_next_sweep(&worker, formatter);
    } else {
        println!(
            "{}",
            formatter.warning(&format!(
                "Cleanup is disabled; waiting for [cleanup] enabled = true in {}",
                config_path.display()
            ))
        );
    }

    let mut current = config.cleanup.clone();
    let mut reload = tokio::time::interval(RELOAD_INTERVAL);
    reload.set_missed_tick_behavior(MissedTickBehavior::Delay);
    reload.tick().await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    tracing::error!("Failed to listen for Ctrl+C: {}", e);
                }
                break;
            }
            _ = reload.tick() => {
                if let Some(reloaded) = reload_cleanup(config_path) {
                    let plan = plan_reload(&current, &reloaded);
                    apply_plan(&mut worker, &plan, formatter).await;
                    current = reloaded;
                }
            }
        }
    }

    worker.stop().await;
    println!("{}", formatter.format_metrics(&worker.metrics())?);
    Ok(())
}

/// Apply a reload to the worker. The threshold is updated before a restart so the
/// first sweep after re-enabling already uses it.
pub async fn apply_plan(worker: &mut RetentionWorker, plan: &ReloadPlan, formatter: &Formatter) {
    if let Some(max_age) = plan.max_age {
        match max_age.as_duration() {
            Ok(duration) => worker.update_threshold(duration),
            Err(e) => tracing::warn!("Ignoring reloaded max_age: {}", e),
        }
    }

    if plan.restart_needed {
        tracing::warn!("managed_dir and dry_run changes take effect after a restart");
    }

    match plan.enable {
        Some(true) => {
            worker.start();
            println!("{}", formatter.success("Cleanup enabled"));
            print_next_sweep(worker, formatter);
        }
        Some(false) => {
            worker.stop().await;
            println!("{}", formatter.info("Cleanup disabled"));
        }
        None => {}
    }
}

fn print_next_sweep(worker: &RetentionWorker, formatter: &Formatter) {
    if let Some(at) = worker.next_sweep_at() {
        println!(
            "{}",
            formatter.info(&format!("Next sweep at {}", at.format("%H:%M:%S")))
        );
    }
}
