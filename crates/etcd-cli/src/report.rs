//! Result rendering: human-readable and JSON

use colored::Colorize;

use etcd_engine::ReconcileResult;

use crate::error::Result;

/// Render the result for a terminal.
pub fn render_human(result: &ReconcileResult, dry_run: bool) -> String {
    if let Some(error) = &result.error {
        return format!("{} {}", "failed:".red().bold(), error);
    }

    if !result.changed {
        return format!("{} {} already matches", "unchanged".green().bold(), result.key);
    }

    let mut line = format!("{} at {}", result.action, result.key);
    if let Some(prior) = &result.prior_value {
        line.push_str(&format!(" (was '{prior}')"));
    }
    if dry_run {
        format!("{} would {}", "[dry-run]".cyan(), line)
    } else {
        format!("{} {}", "changed".yellow().bold(), line)
    }
}

/// Render the result as pretty-printed JSON.
pub fn render_json(result: &ReconcileResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
