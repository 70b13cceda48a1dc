//! stackvault - versioned template cache for product stacks
//!
//! Renders product stack templates, guards locked versions with on-disk
//! snapshots, uploads fresh artifacts by content digest and reuses
//! previously built versions recorded in a JSON manifest.

pub mod cli;
pub mod config;
pub mod definition;
pub mod error;
pub mod hashing;
pub mod journal;
pub mod manifest;
pub mod resolver;
pub mod sink;
pub mod snapshot;
pub mod template;
pub mod ui;

pub use error::{StackVaultError, StackVaultResult};
pub use manifest::{FileManifestStore, Manifest, ManifestStore, VersionRecord};
pub use resolver::{
    ProductVersionSet, ResolutionOutcome, ResolvedArtifact, VersionDeclaration, VersionResolver,
};
pub use sink::{ArtifactLocation, ArtifactSink};
pub use snapshot::{SnapshotGuard, SnapshotKey};
pub use template::{Renderer, TemplateDocument};
