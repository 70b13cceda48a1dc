//! Version resolution
//!
//! Turns a product's declared versions into the ordered list of artifacts
//! that make up the product definition. Each version ends up either:
//!
//! - **fresh**: rendered, optionally checked against its snapshot, uploaded;
//! - **cached**: pointed at the artifact a previous build recorded in the
//!   manifest, with no render and no upload.
//!
//! Fresh versions come first in declaration order, then cached versions in
//! declaration order. A version name may appear only once per product.
//! Resolution is all-or-nothing: the first failure aborts the product.

pub mod declaration;

pub use declaration::{ProductVersionSet, TemplateSource, VersionDeclaration};

use crate::error::{StackVaultError, StackVaultResult};
use crate::hashing::artifact_key;
use crate::manifest::{ManifestStore, VersionRecord};
use crate::sink::{ArtifactLocation, ArtifactSink};
use crate::snapshot::{SnapshotGuard, SnapshotKey, DEFAULT_SNAPSHOT_DIR};
use declaration::{NormalizedVersion, Plan};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

/// How a version was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionOutcome {
    Fresh,
    Cached,
}

impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh => write!(f, "fresh"),
            Self::Cached => write!(f, "cached"),
        }
    }
}

/// One entry of the resolved product definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedArtifact {
    pub version_name: String,
    pub stack_id: String,
    pub description: String,
    pub disable_template_validation: bool,
    pub digest: String,
    pub location: ArtifactLocation,
    pub outcome: ResolutionOutcome,
}

impl ResolvedArtifact {
    /// Manifest record describing this artifact
    pub fn to_record(&self, product_name: &str) -> VersionRecord {
        VersionRecord {
            product_name: product_name.to_string(),
            stack_id: self.stack_id.clone(),
            version_name: self.version_name.clone(),
            digest: self.digest.clone(),
            description: self.description.clone(),
            validate_template: !self.disable_template_validation,
        }
    }
}

/// Resolves product version sets against a manifest store and a sink
pub struct VersionResolver<'a> {
    store: &'a dyn ManifestStore,
    sink: &'a dyn ArtifactSink,
    snapshot_dir: PathBuf,
    known_buckets: BTreeMap<String, String>,
}

impl<'a> VersionResolver<'a> {
    pub fn new(store: &'a dyn ManifestStore, sink: &'a dyn ArtifactSink) -> Self {
        Self {
            store,
            sink,
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            known_buckets: BTreeMap::new(),
        }
    }

    /// Snapshot directory for versions that do not name one
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = dir.into();
        self
    }

    /// Record the bucket a previous build stored `stack_id`'s artifacts in
    pub fn with_known_bucket(
        mut self,
        stack_id: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        self.known_buckets.insert(stack_id.into(), bucket.into());
        self
    }

    /// Resolve every declared version of a product
    pub fn resolve(&self, set: &ProductVersionSet) -> StackVaultResult<Vec<ResolvedArtifact>> {
        let product = set.product_name.as_str();
        if product.is_empty() {
            return Err(StackVaultError::InvalidName {
                kind: "product",
                name: String::new(),
                reason: "must not be empty".to_string(),
            });
        }

        // Normalize everything up front so bad input fails before any upload
        let normalized = set
            .versions
            .iter()
            .map(|decl| decl.normalize(product, &self.snapshot_dir))
            .collect::<StackVaultResult<Vec<_>>>()?;

        let mut claimed: HashSet<&str> = HashSet::new();
        let mut buckets = self.known_buckets.clone();
        let mut fresh = Vec::new();
        let mut pending = Vec::new();

        for version in &normalized {
            match &version.plan {
                Plan::Cached => {
                    debug!("Deferring {} to manifest lookup", version.version_name);
                    pending.push(version);
                }
                Plan::Fresh { renderer, snapshot } => {
                    if !claimed.insert(version.version_name) {
                        return Err(duplicate(product, version));
                    }

                    let document = renderer
                        .render()
                        .map_err(|e| render_failure(version.version_name, e))?;
                    debug!(
                        "Rendered {} ({} bytes, {})",
                        version.version_name,
                        document.len(),
                        document.digest()
                    );

                    if let Some(policy) = snapshot {
                        let key = SnapshotKey::new(
                            version.stack_path_id.clone(),
                            version.stack_id,
                            version.version_name,
                        );
                        SnapshotGuard::new(&policy.directory).reconcile(
                            &key,
                            document.bytes(),
                            policy.locked,
                        )?;
                    }

                    let location = self
                        .sink
                        .upload(document.bytes(), &artifact_key(document.digest()))?;
                    buckets
                        .entry(version.stack_id.to_string())
                        .or_insert_with(|| location.bucket_name.clone());

                    info!(
                        "Resolved {}/{} fresh at {}",
                        product, version.version_name, location.http_url
                    );
                    fresh.push(artifact(version, document.digest(), location, ResolutionOutcome::Fresh));
                }
            }
        }

        if pending.is_empty() {
            return Ok(fresh);
        }

        let manifest = self.store.load()?;
        let mut cached = Vec::with_capacity(pending.len());

        for version in pending {
            let bucket = buckets.get(version.stack_id).ok_or_else(|| {
                StackVaultError::MissingBaseArtifact {
                    product: product.to_string(),
                    stack: version.stack_id.to_string(),
                    version: version.version_name.to_string(),
                }
            })?;

            if !claimed.insert(version.version_name) {
                return Err(duplicate(product, version));
            }

            let record = manifest
                .lookup(product, version.stack_id, version.version_name)
                .ok_or_else(|| StackVaultError::VersionNotFound {
                    product: product.to_string(),
                    stack: version.stack_id.to_string(),
                    version: version.version_name.to_string(),
                })?;

            let location = self.sink.locate(bucket, &artifact_key(&record.digest));
            info!(
                "Resolved {}/{} from history at {}",
                product, version.version_name, location.http_url
            );
            cached.push(artifact(version, &record.digest, location, ResolutionOutcome::Cached));
        }

        fresh.extend(cached);
        Ok(fresh)
    }
}

fn artifact(
    version: &NormalizedVersion<'_>,
    digest: &str,
    location: ArtifactLocation,
    outcome: ResolutionOutcome,
) -> ResolvedArtifact {
    ResolvedArtifact {
        version_name: version.version_name.to_string(),
        stack_id: version.stack_id.to_string(),
        description: version.description.clone(),
        disable_template_validation: !version.validate_template,
        digest: digest.to_string(),
        location,
        outcome,
    }
}

fn duplicate(product: &str, version: &NormalizedVersion<'_>) -> StackVaultError {
    StackVaultError::DuplicateVersion {
        product: product.to_string(),
        stack: version.stack_id.to_string(),
        version: version.version_name.to_string(),
    }
}

fn render_failure(version: &str, err: StackVaultError) -> StackVaultError {
    match err {
        StackVaultError::RenderFailure { reason, .. } => StackVaultError::render(version, reason),
        other => StackVaultError::render(version, other.to_string()),
    }
}
