//! Config command - show configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::StackVaultResult;
use std::path::Path;

/// Execute the config command
///
/// `path` is the file the configuration was loaded from (or would be).
pub fn execute(args: ConfigArgs, config: &Config, path: &Path) -> StackVaultResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => {
            println!("{}", toml::to_string_pretty(config)?);
        }
        Some(ConfigAction::Path) => println!("{}", path.display()),
    }
    Ok(())
}
