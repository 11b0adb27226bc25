//! Output formatting for the CLI.

use crate::config::{Config, OutputFormat};
use crate::error::Result;
use colored::*;
use serde::Serialize;
use snapwarden_retention::{RetentionMetrics, SweepOutcome};
use std::path::PathBuf;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Snapshot of the managed directory shown by `status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub managed_dir: PathBuf,
    pub cleanup_enabled: bool,
    pub max_age: String,
    pub image_files: usize,
    pub eligible_files: usize,
    pub folder_size_bytes: u64,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the status report.
    pub fn format_status(&self, report: &StatusReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => {
                let enabled = if report.cleanup_enabled { "yes" } else { "no" };
                Ok(key_value_table([
                    ("Managed directory", report.managed_dir.display().to_string()),
                    ("Cleanup enabled", enabled.to_string()),
                    ("Max age", report.max_age.clone()),
                    ("Image files", report.image_files.to_string()),
                    ("Eligible for deletion", report.eligible_files.to_string()),
                    ("Folder size", format_size(report.folder_size_bytes)),
                ]))
            }
        }
    }

    /// Format the result of a single sweep.
    pub fn format_outcome(&self, outcome: &SweepOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
            OutputFormat::Table if outcome.dry_run => Ok(self.info(&format!(
                "Dry run: {} file(s) would be deleted",
                outcome.candidates
            ))),
            OutputFormat::Table if outcome.failed > 0 => Ok(self.warning(&format!(
                "Deleted {} file(s), {} could not be removed",
                outcome.deleted, outcome.failed
            ))),
            OutputFormat::Table if outcome.did_work() => {
                Ok(self.success(&format!("Deleted {} file(s)", outcome.deleted)))
            }
            OutputFormat::Table => Ok(self.info("Nothing to delete")),
        }
    }

    /// Format cumulative worker metrics.
    pub fn format_metrics(&self, metrics: &RetentionMetrics) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(metrics)?),
            OutputFormat::Table => Ok(metrics.summary()),
        }
    }

    /// Format the configuration.
    pub fn format_config(&self, config: &Config) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
            OutputFormat::Table => Ok(key_value_table([
                (
                    "cleanup.managed_dir",
                    config.cleanup.managed_dir.display().to_string(),
                ),
                ("cleanup.enabled", config.cleanup.enabled.to_string()),
                ("cleanup.max_age", config.cleanup.max_age.to_string()),
                ("cleanup.dry_run", config.cleanup.dry_run.to_string()),
                ("logging.level", config.logging.level.clone()),
                ("logging.file", config.logging.file.to_string()),
                (
                    "logging.directory",
                    config.logging.directory.display().to_string(),
                ),
                ("settings.color", config.settings.color.to_string()),
            ])),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn key_value_table<const N: usize>(rows: [(&str, String); N]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Setting", "Value"]);
    for (key, value) in rows {
        builder.push_record([key.to_string(), value]);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
