//! CLI command implementations

pub mod config;
pub mod digest;
pub mod manifest;
pub mod synth;

pub use config::execute as config;
pub use digest::execute as digest;
pub use manifest::execute as manifest;
pub use synth::execute as synth;
