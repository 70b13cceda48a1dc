//! Synthesis journal
//!
//! Appends one JSON line per resolved artifact to `.stackvault/journal.log`
//! (configurable). Enabled by default; disable with `general.journal = false`.

use crate::config::schema::Config;
use crate::resolver::ResolvedArtifact;
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File-based journal that appends JSON lines
pub struct SynthesisJournal {
    enabled: bool,
    path: PathBuf,
}

impl SynthesisJournal {
    /// Create a journal from config
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.journal,
            path: config.general.journal_path.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a resolved artifact as `artifact.fresh` or `artifact.cached`
    pub fn record_artifact(&self, product: &str, artifact: &ResolvedArtifact) {
        self.log(
            &format!("artifact.{}", artifact.outcome),
            &serde_json::json!({
                "product": product,
                "stack": artifact.stack_id,
                "version": artifact.version_name,
                "digest": artifact.digest,
                "url": artifact.location.http_url,
            }),
        );
    }

    /// Log an event as a JSON line
    ///
    /// Drops events on IO failure; the journal never fails a synthesis pass.
    pub fn log(&self, event: &str, data: &serde_json::Value) {
        if !self.enabled {
            return;
        }

        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": event,
            "data": data,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize journal event: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line) {
            warn!("Failed to write journal {}: {}", self.path.display(), e);
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.write_all(line.as_bytes())?;
        file.flush()
    }
}
