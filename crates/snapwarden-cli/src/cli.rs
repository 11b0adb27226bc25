//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use snapwarden_retention::AgeUnit;
use std::path::PathBuf;

/// Snapwarden - Keep a screenshot folder from growing without bound.
#[derive(Debug, Parser)]
#[command(name = "snapwarden")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SNAPWARDEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the retention worker until interrupted
    Run,

    /// Sweep the managed directory once
    Sweep(SweepArgs),

    /// Show the managed directory and what a sweep would remove
    Status,

    /// Inspect or edit the configuration file
    Config(ConfigArgs),
}

/// Arguments for the sweep command.
#[derive(Debug, Parser)]
pub struct SweepArgs {
    /// List eligible files without deleting them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Change the deletion threshold
    SetMaxAge {
        /// Threshold value
        value: f64,
        /// Threshold unit
        #[arg(value_enum)]
        unit: UnitArg,
    },

    /// Change the managed directory
    SetDir {
        /// Directory captures are written into
        path: PathBuf,
    },
}

/// Threshold unit argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum UnitArg {
    /// Minutes (1-60)
    Minutes,
    /// Hours (1-525600)
    Hours,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<UnitArg> for AgeUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Minutes => AgeUnit::Minutes,
            UnitArg::Hours => AgeUnit::Hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from(["snapwarden", "run"]);
        assert!(matches!(cli.command, Command::Run));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_sweep_dry_run() {
        let cli = Cli::parse_from(["snapwarden", "-vv", "sweep", "--dry-run"]);
        match cli.command {
            Command::Sweep(args) => assert!(args.dry_run),
            _ => panic!("Expected Sweep command"),
        }
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_set_max_age() {
        let cli = Cli::parse_from(["snapwarden", "config", "set-max-age", "30", "minutes"]);
        match cli.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::SetMaxAge { value, unit },
            }) => {
                assert_eq!(value, 30.0);
                assert_eq!(AgeUnit::from(unit), AgeUnit::Minutes);
            }
            _ => panic!("Expected SetMaxAge"),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "snapwarden",
            "status",
            "--format",
            "json",
            "--config",
            "/tmp/snapwarden.toml",
        ]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/snapwarden.toml")));
    }

    #[test]
    fn test_rejects_unknown_unit() {
        let result = Cli::try_parse_from(["snapwarden", "config", "set-max-age", "3", "days"]);
        assert!(result.is_err());
    }
}
