//! Manifest command - inspect recorded versions

use crate::cli::args::{ManifestAction, ManifestArgs, OutputFormat};
use crate::config::Config;
use crate::error::{StackVaultError, StackVaultResult};
use crate::manifest::{FileManifestStore, ManifestStore, VersionRecord};
use crate::ui::{self, UiContext};
use console::style;

/// Execute the manifest command
pub fn execute(args: ManifestArgs, config: &Config) -> StackVaultResult<()> {
    let store = FileManifestStore::new(&config.manifest.path);

    match args.action {
        ManifestAction::Show { format } => {
            let records = store.load()?.records();
            if records.is_empty() {
                match format {
                    OutputFormat::Json => println!("[]"),
                    OutputFormat::Plain => {}
                    OutputFormat::Table => ui::step_info(
                        &UiContext::detect(),
                        &format!("No versions recorded in {}", store.path().display()),
                    ),
                }
                return Ok(());
            }
            print_records(&records, format)
        }
        ManifestAction::Lookup {
            product,
            stack,
            version_name,
            format,
        } => {
            let record = store.lookup(&product, &stack, &version_name)?.ok_or(
                StackVaultError::VersionNotFound {
                    product,
                    stack,
                    version: version_name,
                },
            )?;
            print_records(&[record], format)
        }
    }
}

fn print_records(records: &[VersionRecord], format: OutputFormat) -> StackVaultResult<()> {
    match format {
        OutputFormat::Table => print_table(records),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Plain => {
            for r in records {
                println!("{}/{}/{}\t{}", r.product_name, r.stack_id, r.version_name, r.digest);
            }
        }
    }
    Ok(())
}

fn print_table(records: &[VersionRecord]) {
    println!(
        "{:<20} {:<20} {:<16} {:<66} {}",
        style("PRODUCT").bold(),
        style("STACK").bold(),
        style("VERSION").bold(),
        style("DIGEST").bold(),
        style("VALIDATE").bold()
    );
    println!("{}", "-".repeat(130));

    for r in records {
        let validate = if r.validate_template {
            style("yes").green()
        } else {
            style("no").yellow()
        };
        println!(
            "{:<20} {:<20} {:<16} {:<66} {}",
            r.product_name, r.stack_id, r.version_name, r.digest, validate
        );
    }

    println!();
    println!("{} version(s)", records.len());
}
