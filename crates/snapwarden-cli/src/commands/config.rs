//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use snapwarden_retention::MaxAge;
use std::path::{Path, PathBuf};

/// Execute the config command.
pub async fn execute_config(
    args: ConfigArgs,
    config_path: &Path,
    config: &mut Config,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => show_config(config_path, config, formatter),
        ConfigAction::Init { force } => init_config(config_path, force, formatter),
        ConfigAction::SetMaxAge { value, unit } => {
            set_max_age(config_path, config, MaxAge::new(value, unit.into()), formatter)
        }
        ConfigAction::SetDir { path } => set_dir(config_path, config, path, formatter),
    }
}

fn show_config(config_path: &Path, config: &Config, formatter: &Formatter) -> Result<()> {
    let source = if config_path.exists() {
        format!("Config file: {}", config_path.display())
    } else {
        format!("Config file: {} (not created, using defaults)", config_path.display())
    };
    println!("{}", formatter.info(&source));
    println!("{}", formatter.format_config(config)?);
    Ok(())
}

/// Write a default config file.
fn init_config(config_path: &Path, force: bool, formatter: &Formatter) -> Result<()> {
    if config_path.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )));
    }

    Config::default().save_to(config_path)?;
    println!(
        "{}",
        formatter.success(&format!("Wrote default config to {}", config_path.display()))
    );
    Ok(())
}

/// Validate and persist a new threshold.
///
/// A running worker picks the change up on its next config reload.
fn set_max_age(
    config_path: &Path,
    config: &mut Config,
    max_age: MaxAge,
    formatter: &Formatter,
) -> Result<()> {
    max_age.validate()?;

    config.cleanup.max_age = max_age;
    config.save_to(config_path)?;
    println!(
        "{}",
        formatter.success(&format!("Max age set to {}", max_age))
    );
    Ok(())
}

fn set_dir(
    config_path: &Path,
    config: &mut Config,
    path: PathBuf,
    formatter: &Formatter,
) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(CliError::InvalidInput("managed directory cannot be empty".into()));
    }

    config.cleanup.managed_dir = path;
    config.save_to(config_path)?;
    println!(
        "{}",
        formatter.success(&format!(
            "Managed directory set to {}",
            config.cleanup.managed_dir.display()
        ))
    );
    Ok(())
}
