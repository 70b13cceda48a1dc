//! Product definition files
//!
//! A product definition is a TOML file listing the versions of one product:
//!
//! ```toml
//! [product]
//! name = "Storage"
//!
//! [[versions]]
//! name = "v1"
//! stack = "Bucket"
//! from_history = true
//!
//! [[versions]]
//! name = "v2"
//! stack = "Bucket"
//! template = "templates/bucket-v2.json"
//! locked = true
//! ```
//!
//! Each version names exactly one source: `template` (render a JSON file),
//! `snapshot = true` (replay the stored snapshot) or `from_history = true`
//! (reuse the artifact recorded in the manifest). Relative paths are
//! resolved against the directory holding the definition file.

use crate::error::{StackVaultError, StackVaultResult};
use crate::resolver::declaration::path_id_for;
use crate::resolver::{ProductVersionSet, VersionDeclaration};
use crate::snapshot::{SnapshotKey, SnapshotTemplate};
use crate::template::TemplateFile;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Parsed product definition
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductDefinition {
    pub product: ProductMeta,

    #[serde(default)]
    pub versions: Vec<VersionEntry>,
}

/// `[product]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductMeta {
    pub name: String,
}

/// One `[[versions]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionEntry {
    pub name: String,
    pub stack: String,
    pub path_id: Option<String>,
    pub description: Option<String>,
    pub validate_template: Option<bool>,

    /// JSON template file to render
    pub template: Option<PathBuf>,

    /// Replay the stored snapshot instead of rendering
    #[serde(default)]
    pub snapshot: bool,

    /// Reuse the artifact recorded in the manifest
    #[serde(default)]
    pub from_history: bool,

    pub locked: Option<bool>,
    pub snapshot_dir: Option<PathBuf>,
}

impl ProductDefinition {
    /// Parse a definition from a TOML file on disk
    pub fn from_file(path: &Path) -> StackVaultResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StackVaultError::io(format!("reading product definition {}", path.display()), e)
        })?;
        Self::parse(&content, path)
    }

    /// Parse a definition from a TOML string; `path` is only used in errors
    pub fn parse(content: &str, path: &Path) -> StackVaultResult<Self> {
        toml::from_str(content).map_err(|e| StackVaultError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Build the version set the resolver consumes
    ///
    /// `base_dir` anchors relative paths; `default_snapshot_dir` is where
    /// replayed snapshots are read from when an entry names no directory.
    pub fn into_version_set(
        self,
        base_dir: &Path,
        default_snapshot_dir: &Path,
    ) -> StackVaultResult<ProductVersionSet> {
        let product = self.product.name;
        let mut set = ProductVersionSet::new(product.clone());

        for entry in self.versions {
            let declaration = entry.into_declaration(&product, base_dir, default_snapshot_dir)?;
            set = set.version(declaration);
        }
        Ok(set)
    }
}

impl VersionEntry {
    fn into_declaration(
        self,
        product: &str,
        base_dir: &Path,
        default_snapshot_dir: &Path,
    ) -> StackVaultResult<VersionDeclaration> {
        let sources = [self.template.is_some(), self.snapshot, self.from_history]
            .iter()
            .filter(|set| **set)
            .count();
        if sources != 1 {
            return Err(StackVaultError::User(format!(
                "Version {} must set exactly one of `template`, `snapshot` or `from_history`",
                self.name
            )));
        }

        let snapshot_dir = self.snapshot_dir.map(|dir| base_dir.join(dir));

        let mut declaration = if self.from_history {
            VersionDeclaration::from_history(&self.name, &self.stack)
        } else if let Some(template) = self.template {
            VersionDeclaration::fresh(&self.name, &self.stack, TemplateFile::new(base_dir.join(template)))
        } else {
            let directory = snapshot_dir
                .clone()
                .unwrap_or_else(|| default_snapshot_dir.to_path_buf());
            let key = SnapshotKey::new(
                self.path_id.clone().unwrap_or_else(|| path_id_for(product)),
                &self.stack,
                &self.name,
            );
            VersionDeclaration::fresh(&self.name, &self.stack, SnapshotTemplate::new(directory, key))
        };

        if let Some(path_id) = self.path_id {
            declaration = declaration.stack_path_id(path_id);
        }
        if let Some(description) = self.description {
            declaration = declaration.description(description);
        }
        if let Some(validate) = self.validate_template {
            declaration = declaration.validate_template(validate);
        }
        if let Some(locked) = self.locked {
            declaration = declaration.locked(locked);
        }
        if let Some(dir) = snapshot_dir {
            declaration = declaration.snapshot_dir(dir);
        }

        Ok(declaration)
    }
}
