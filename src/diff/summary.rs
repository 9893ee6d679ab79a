//! Always-included file listing, grouped by tier.

use super::triage::ClassifiedFile;

/// Render the grouped file listing.
///
/// Every triaged file appears regardless of any budget; a heading is emitted
/// on each tier transition and the dropped-noise count is noted at the end.
pub fn render_summary(files: &[ClassifiedFile<'_>], noise_count: usize) -> String {
    let mut lines = vec!["FILES CHANGED:".to_string()];
    let mut current_tier = None;

    for file in files {
        if current_tier != Some(file.tier) {
            lines.push(format!("\n[{}]", file.tier.label()));
            current_tier = Some(file.tier);
        }
        lines.push(format!(
            "  {} (+{} -{})",
            file.record.path, file.record.additions, file.record.deletions
        ));
    }

    if noise_count > 0 {
        lines.push(format!(
            "\n[Filtered: {noise_count} files (lock files, generated code)]"
        ));
    }

    lines.join("\n")
}
