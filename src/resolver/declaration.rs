//! Version declarations and their normalization
//!
//! Declarations leave most settings optional. Every default is applied here,
//! once per declaration, so the resolver only ever branches on fully
//! populated values.

use crate::error::{StackVaultError, StackVaultResult};
use crate::template::Renderer;
use std::path::{Path, PathBuf};

/// Where a declared version's template comes from
#[derive(Debug)]
pub enum TemplateSource {
    /// Render now, snapshot if a lock is declared, upload
    Fresh {
        renderer: Box<dyn Renderer>,
        /// `None` = no snapshot, `Some(false)` = mutable snapshot, `Some(true)` = locked
        locked: Option<bool>,
        snapshot_dir: Option<PathBuf>,
    },

    /// Reuse the artifact a previous build recorded in the manifest
    CachedFromHistory,
}

/// One version of a product as declared by the caller
#[derive(Debug)]
pub struct VersionDeclaration {
    pub version_name: String,
    pub stack_id: String,
    pub stack_path_id: Option<String>,
    pub description: Option<String>,
    pub validate_template: Option<bool>,
    pub source: TemplateSource,
}

impl VersionDeclaration {
    /// Declare a version built from a fresh render
    pub fn fresh(
        version_name: impl Into<String>,
        stack_id: impl Into<String>,
        renderer: impl Renderer + 'static,
    ) -> Self {
        Self::with_source(
            version_name,
            stack_id,
            TemplateSource::Fresh {
                renderer: Box::new(renderer),
                locked: None,
                snapshot_dir: None,
            },
        )
    }

    /// Declare a version reused from the manifest
    pub fn from_history(version_name: impl Into<String>, stack_id: impl Into<String>) -> Self {
        Self::with_source(version_name, stack_id, TemplateSource::CachedFromHistory)
    }

    fn with_source(
        version_name: impl Into<String>,
        stack_id: impl Into<String>,
        source: TemplateSource,
    ) -> Self {
        Self {
            version_name: version_name.into(),
            stack_id: stack_id.into(),
            stack_path_id: None,
            description: None,
            validate_template: None,
            source,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate_template(mut self, validate: bool) -> Self {
        self.validate_template = Some(validate);
        self
    }

    pub fn stack_path_id(mut self, id: impl Into<String>) -> Self {
        self.stack_path_id = Some(id.into());
        self
    }

    /// Snapshot this version; `true` makes the snapshot an integrity contract.
    /// Ignored for versions reused from history.
    pub fn locked(mut self, lock: bool) -> Self {
        if let TemplateSource::Fresh { locked, .. } = &mut self.source {
            *locked = Some(lock);
        }
        self
    }

    /// Snapshot directory for this version. Ignored for versions reused from history.
    pub fn snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        if let TemplateSource::Fresh { snapshot_dir, .. } = &mut self.source {
            *snapshot_dir = Some(dir.into());
        }
        self
    }

    pub fn is_from_history(&self) -> bool {
        matches!(self.source, TemplateSource::CachedFromHistory)
    }

    /// Apply defaults and validate names
    pub(crate) fn normalize(
        &self,
        product_name: &str,
        default_snapshot_dir: &Path,
    ) -> StackVaultResult<NormalizedVersion<'_>> {
        validate_name("version", &self.version_name, true)?;
        validate_name("stack", &self.stack_id, false)?;

        let stack_path_id = match &self.stack_path_id {
            Some(id) => id.clone(),
            None => path_id_for(product_name),
        };
        validate_name("stack path", &stack_path_id, false)?;

        let plan = match &self.source {
            TemplateSource::CachedFromHistory => Plan::Cached,
            TemplateSource::Fresh {
                renderer,
                locked,
                snapshot_dir,
            } => {
                let tracking = renderer.tracking();
                let locked = (*locked).or(tracking.map(|t| t.locked));
                let directory = snapshot_dir
                    .clone()
                    .or_else(|| tracking.and_then(|t| t.snapshot_dir.clone()))
                    .unwrap_or_else(|| default_snapshot_dir.to_path_buf());

                Plan::Fresh {
                    renderer: &**renderer,
                    snapshot: locked.map(|locked| SnapshotPolicy { directory, locked }),
                }
            }
        };

        Ok(NormalizedVersion {
            version_name: &self.version_name,
            stack_id: &self.stack_id,
            stack_path_id,
            description: self.description.clone().unwrap_or_default(),
            validate_template: self.validate_template.unwrap_or(true),
            plan,
        })
    }
}

/// The declared versions of one product
#[derive(Debug)]
pub struct ProductVersionSet {
    pub product_name: String,
    pub versions: Vec<VersionDeclaration>,
}

impl ProductVersionSet {
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            versions: Vec::new(),
        }
    }

    /// Append a declaration
    pub fn version(mut self, declaration: VersionDeclaration) -> Self {
        self.versions.push(declaration);
        self
    }
}

/// Snapshot handling for a fresh version
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SnapshotPolicy {
    pub directory: PathBuf,
    pub locked: bool,
}

pub(crate) enum Plan<'a> {
    Fresh {
        renderer: &'a dyn Renderer,
        snapshot: Option<SnapshotPolicy>,
    },
    Cached,
}

/// A declaration with every default applied
pub(crate) struct NormalizedVersion<'a> {
    pub version_name: &'a str,
    pub stack_id: &'a str,
    pub stack_path_id: String,
    pub description: String,
    pub validate_template: bool,
    pub plan: Plan<'a>,
}

/// Validate that a name is safe to use in a snapshot file name.
///
/// The file name joins path id, stack id and version with `.`, so only the
/// last segment (the version) may contain dots; otherwise two different
/// triples could share one file.
fn validate_name(kind: &'static str, name: &str, allow_dots: bool) -> StackVaultResult<()> {
    let invalid = |reason: &str| StackVaultError::InvalidName {
        kind,
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if name.contains("..") {
        return Err(invalid("must not contain '..'"));
    }
    if !allow_dots && name.contains('.') {
        return Err(invalid("must not contain '.'"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(invalid(
            "must contain only alphanumeric characters, '-', '_' or '.'",
        ));
    }
    Ok(())
}

/// Snapshot path id derived from a product name
///
/// Alphanumerics and `-` are kept; every other character becomes
/// `_{hex code point}_`. Distinct product names give distinct path ids.
pub(crate) fn path_id_for(product_name: &str) -> String {
    let mut id = String::with_capacity(product_name.len());
    for c in product_name.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            id.push(c);
        } else {
            id.push_str(&format!("_{:x}_", u32::from(c)));
        }
    }
    id
}
