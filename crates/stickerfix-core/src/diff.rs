//! Unified diff generation for dry-run previews.
//!
//! The rules only ever replace text within a line, so the original and the
//! rewritten buffer have the same line structure. Each changed line becomes
//! its own single-line hunk.

/// Generate a unified diff between `original` and `rewritten`.
///
/// Returns an empty string when nothing changed.
pub fn generate_unified_diff(file: &str, original: &str, rewritten: &str) -> String {
    let mut hunks = String::new();
    let mut old_lines = original.lines();
    let mut new_lines = rewritten.lines();
    let mut line = 0u32;

    loop {
        line += 1;
        match (old_lines.next(), new_lines.next()) {
            (None, None) => break,
            (Some(old), Some(new)) if old == new => continue,
            (old, new) => {
                let old_count = u32::from(old.is_some());
                let new_count = u32::from(new.is_some());
                hunks.push_str(&format!(
                    "@@ -{},{} +{},{} @@\n",
                    line, old_count, line, new_count
                ));
                if let Some(old) = old {
                    hunks.push_str(&format!("-{}\n", old));
                }
                if let Some(new) = new {
                    hunks.push_str(&format!("+{}\n", new));
                }
            }
        }
    }

    if hunks.is_empty() {
        return hunks;
    }

    let mut diff = String::new();
    diff.push_str(&format!("--- a/{}\n", file));
    diff.push_str(&format!("+++ b/{}\n", file));
    diff.push_str(&hunks);
    diff
}

// ============================================================================
// Tests
// ============================================================================
