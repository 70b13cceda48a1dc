//! Output functions for consistent CLI formatting

use super::context::UiContext;
use console::style;

/// Section heading
pub fn heading(ctx: &UiContext, title: &str) {
    if ctx.is_interactive() {
        eprintln!("{}", style(title).cyan().bold());
    } else {
        eprintln!("{}", title);
    }
}

/// Success step with detail
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.is_interactive() {
        eprintln!("  {} {} ({})", style("✓").green(), message, style(detail).dim());
    } else {
        eprintln!("  [OK] {} ({})", message, detail);
    }
}

/// Informational step
pub fn step_info(ctx: &UiContext, message: &str) {
    if ctx.is_interactive() {
        eprintln!("  {} {}", style("•").cyan(), message);
    } else {
        eprintln!("  [INFO] {}", message);
    }
}

/// Warning step with hint
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    if ctx.is_interactive() {
        eprintln!("  {} {} - {}", style("!").yellow(), message, style(hint).dim());
    } else {
        eprintln!("  [WARN] {} - {}", message, hint);
    }
}

/// Key-value pair
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.is_interactive() {
        eprintln!("  {}: {}", style(key).dim(), value);
    } else {
        eprintln!("  {}: {}", key, value);
    }
}
