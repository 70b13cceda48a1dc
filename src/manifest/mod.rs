//! Version manifest
//!
//! The manifest is the cross-invocation record of previously built template
//! versions, keyed `product -> stack -> version`. It is what lets a later
//! build reuse a version from history instead of rebuilding it.
//!
//! # File format
//!
//! ```json
//! {
//!   "Product": {
//!     "Stack": {
//!       "v1": { "digest": "…", "description": "…", "validateTemplate": true }
//!     }
//!   }
//! }
//! ```

pub mod store;

pub use store::{FileManifestStore, ManifestStore, MemoryManifestStore, DEFAULT_MANIFEST_FILE};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_true() -> bool {
    true
}

/// A manifest entry as stored on disk, without its key triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Content digest of the template body
    pub digest: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Whether template validation was enforced for this build
    #[serde(default = "default_true")]
    pub validate_template: bool,
}

/// One recorded version of a product stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub product_name: String,
    pub stack_id: String,
    pub version_name: String,
    pub digest: String,
    pub description: String,
    pub validate_template: bool,
}

impl VersionRecord {
    fn from_entry(product: &str, stack: &str, version: &str, entry: &ManifestEntry) -> Self {
        Self {
            product_name: product.to_string(),
            stack_id: stack.to_string(),
            version_name: version.to_string(),
            digest: entry.digest.clone(),
            description: entry.description.clone(),
            validate_template: entry.validate_template,
        }
    }

    fn to_entry(&self) -> ManifestEntry {
        ManifestEntry {
            digest: self.digest.clone(),
            description: self.description.clone(),
            validate_template: self.validate_template,
        }
    }
}

type StackVersions = BTreeMap<String, ManifestEntry>;
type ProductStacks = BTreeMap<String, StackVersions>;

/// In-memory view of the manifest document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    products: BTreeMap<String, ProductStacks>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the record for a triple. `None` if any level is missing.
    pub fn lookup(&self, product: &str, stack: &str, version: &str) -> Option<VersionRecord> {
        self.products
            .get(product)?
            .get(stack)?
            .get(version)
            .map(|entry| VersionRecord::from_entry(product, stack, version, entry))
    }

    /// Insert or replace the record for its triple, leaving siblings untouched
    pub fn insert(&mut self, record: &VersionRecord) {
        self.products
            .entry(record.product_name.clone())
            .or_default()
            .entry(record.stack_id.clone())
            .or_default()
            .insert(record.version_name.clone(), record.to_entry());
    }

    /// All records, ordered by product, stack, then version
    pub fn records(&self) -> Vec<VersionRecord> {
        let mut records = Vec::new();
        for (product, stacks) in &self.products {
            for (stack, versions) in stacks {
                for (version, entry) in versions {
                    records.push(VersionRecord::from_entry(product, stack, version, entry));
                }
            }
        }
        records
    }

    /// Number of recorded versions
    pub fn len(&self) -> usize {
        self.products
            .values()
            .flat_map(|stacks| stacks.values())
            .map(|versions| versions.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
