//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// stackvault - versioned template cache for product stacks
///
/// Renders product stack templates, snapshots locked versions, uploads
/// fresh artifacts and reuses previously built versions from the manifest.
#[derive(Parser, Debug)]
#[command(name = "stackvault")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "STACKVAULT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local stackvault.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve every version of a product definition
    Synth(SynthArgs),

    /// Inspect the version manifest
    Manifest(ManifestArgs),

    /// Print the content digest of a template file
    Digest(DigestArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Arguments for the synth command
#[derive(Parser, Debug)]
pub struct SynthArgs {
    /// Product definition file (TOML)
    pub definition: PathBuf,

    /// Record fresh versions in the manifest
    #[arg(long)]
    pub record: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the manifest command
#[derive(Parser, Debug)]
pub struct ManifestArgs {
    #[command(subcommand)]
    pub action: ManifestAction,
}

/// Manifest subcommands
#[derive(Subcommand, Debug)]
pub enum ManifestAction {
    /// List every recorded version
    Show {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Look up one recorded version
    Lookup {
        product: String,
        stack: String,

        // `version` would clash with the propagated --version flag
        /// Version name
        #[arg(value_name = "VERSION")]
        version_name: String,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

/// Arguments for the digest command
#[derive(Parser, Debug)]
pub struct DigestArgs {
    /// JSON template file
    pub file: PathBuf,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
