//! Digest command - print the content digest of a template file
//!
//! The file is rendered first, so the digest matches the artifact a fresh
//! build of the same template would upload.

use crate::cli::args::DigestArgs;
use crate::error::StackVaultResult;
use crate::hashing::artifact_key;
use crate::template::{Renderer, TemplateFile};

/// Execute the digest command
pub fn execute(args: DigestArgs) -> StackVaultResult<()> {
    let document = TemplateFile::new(&args.file).render()?;
    println!("{}  {}", document.digest(), artifact_key(document.digest()));
    Ok(())
}
