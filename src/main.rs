//! stackvault - versioned template cache for product stacks
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use stackvault::cli::{Cli, Commands};
use stackvault::config::{Config, ConfigManager};
use stackvault::error::{StackVaultError, StackVaultResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> StackVaultResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // An explicit --config wins over local discovery
    let local_config_path = if cli.no_local || cli.config.is_some() {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| StackVaultError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager.load_preferred(local_config_path.as_deref())?;
    init_logging(cli.verbose, &config);

    if let Some(ref path) = local_config_path {
        debug!("Found local config: {}", path.display());
    }

    // Dispatch to command
    match cli.command {
        Commands::Synth(args) => stackvault::cli::commands::synth(args, &config),
        Commands::Manifest(args) => stackvault::cli::commands::manifest(args, &config),
        Commands::Digest(args) => stackvault::cli::commands::digest(args),
        Commands::Config(args) => {
            let path = local_config_path
                .as_deref()
                .unwrap_or_else(|| config_manager.path());
            stackvault::cli::commands::config(args, &config, path)
        }
    }
}

/// Initialize logging: 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("stackvault=warn"),
        1 => EnvFilter::new("stackvault=info"),
        _ => EnvFilter::new("stackvault=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
