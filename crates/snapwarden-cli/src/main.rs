//! Snapwarden CLI - Retention worker for a screenshot folder.

use clap::Parser;
use snapwarden_cli::commands;
use snapwarden_cli::logging;
use snapwarden_cli::{Cli, Command, Config, Formatter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> snapwarden_cli::Result<()> {
    let cli = Cli::parse();

    let config_path = Config::resolve_path(cli.config.as_deref())?;
    let mut config = Config::load_from(&config_path)?;

    let _log_guard = logging::init(&config.logging, cli.verbose);
    tracing::debug!("Using config {}", config_path.display());

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Run => commands::execute_run(&config_path, &config, &formatter).await?,
        Command::Sweep(args) => commands::execute_sweep(args, &config, &formatter).await?,
        Command::Status => commands::execute_status(&config, &formatter).await?,
        Command::Config(args) => {
            commands::execute_config(args, &config_path, &mut config, &formatter).await?
        }
    }

    Ok(())
}
