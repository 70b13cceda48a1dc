//! Synth command - resolve every version of a product definition

use crate::cli::args::{OutputFormat, SynthArgs};
use crate::config::Config;
use crate::definition::ProductDefinition;
use crate::error::StackVaultResult;
use crate::journal::SynthesisJournal;
use crate::manifest::{FileManifestStore, ManifestStore};
use crate::resolver::{ResolutionOutcome, ResolvedArtifact, VersionResolver};
use crate::sink::create_sink;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// JSON output shape
#[derive(Serialize)]
struct SynthOutput<'a> {
    product: &'a str,
    artifacts: &'a [ResolvedArtifact],
}

/// Execute the synth command
pub fn execute(args: SynthArgs, config: &Config) -> StackVaultResult<()> {
    let ctx = UiContext::detect();

    let definition = ProductDefinition::from_file(&args.definition)?;
    let base_dir = match args.definition.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let set = definition.into_version_set(base_dir, &config.snapshot.directory)?;
    let product = set.product_name.clone();

    let sink = create_sink(&config.sink)?;
    let store = FileManifestStore::new(&config.manifest.path);
    debug!(
        "Synthesizing {} with {} sink, manifest {}",
        product,
        sink.sink_name(),
        store.path().display()
    );

    let mut resolver =
        VersionResolver::new(&store, sink.as_ref()).with_snapshot_dir(&config.snapshot.directory);
    for (stack, stack_config) in &config.stacks {
        if let Some(bucket) = &stack_config.bucket {
            resolver = resolver.with_known_bucket(stack, bucket);
        }
    }

    let artifacts = resolver.resolve(&set)?;

    let journal = SynthesisJournal::new(config);
    for artifact in &artifacts {
        journal.record_artifact(&product, artifact);
    }

    if args.record {
        let fresh: Vec<_> = artifacts
            .iter()
            .filter(|a| a.outcome == ResolutionOutcome::Fresh)
            .collect();
        for artifact in &fresh {
            store.upsert(&artifact.to_record(&product))?;
        }
        if matches!(args.format, OutputFormat::Table) {
            if fresh.is_empty() {
                ui::step_warn_hint(
                    &ctx,
                    "Nothing recorded",
                    "every version was reused from history",
                );
            } else {
                ui::step_ok_detail(
                    &ctx,
                    &format!("Recorded {} fresh version(s)", fresh.len()),
                    &store.path().display().to_string(),
                );
            }
        }
    }

    match args.format {
        OutputFormat::Table => {
            ui::heading(&ctx, &format!("Product {}", product));
            ui::key_value(&ctx, "sink", sink.sink_name());
            ui::key_value(&ctx, "manifest", &store.path().display().to_string());
            print_table(&ctx, &artifacts);
        }
        OutputFormat::Json => print_json(&product, &artifacts)?,
        OutputFormat::Plain => print_plain(&artifacts),
    }

    Ok(())
}

fn print_table(ctx: &UiContext, artifacts: &[ResolvedArtifact]) {
    if artifacts.is_empty() {
        ui::step_info(ctx, "No versions declared");
        return;
    }

    println!(
        "{:<16} {:<20} {:<8} {:<14} {}",
        style("VERSION").bold(),
        style("STACK").bold(),
        style("OUTCOME").bold(),
        style("DIGEST").bold(),
        style("LOCATION").bold()
    );
    println!("{}", "-".repeat(90));

    for artifact in artifacts {
        let outcome = match artifact.outcome {
            ResolutionOutcome::Fresh => style("fresh").green(),
            ResolutionOutcome::Cached => style("cached").cyan(),
        };
        let digest: String = artifact.digest.chars().take(12).collect();

        println!(
            "{:<16} {:<20} {:<8} {:<14} {}",
            artifact.version_name, artifact.stack_id, outcome, digest, artifact.location.http_url
        );
    }

    println!();
    println!("{} version(s)", artifacts.len());
}

fn print_json(product: &str, artifacts: &[ResolvedArtifact]) -> StackVaultResult<()> {
    let json = serde_json::to_string_pretty(&SynthOutput { product, artifacts })?;
    println!("{}", json);
    Ok(())
}

fn print_plain(artifacts: &[ResolvedArtifact]) {
    for artifact in artifacts {
        println!(
            "{}\t{}\t{}",
            artifact.version_name, artifact.outcome, artifact.location.http_url
        );
    }
}
