//! Terminal output helpers
//!
//! Status lines go to stderr so that `--format json` and `--format plain`
//! output on stdout stays machine-readable.

mod context;
mod output;

pub use context::UiContext;
pub use output::{heading, key_value, step_info, step_ok_detail, step_warn_hint};
