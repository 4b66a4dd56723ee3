//! The text rewriter: read one file, run the rule set, write it back.
//!
//! The whole transformation happens on an in-memory copy, and the result is
//! written to a sibling temp file that is renamed over the target. A failed
//! write therefore leaves the original bytes in place. There is no backup and
//! no lock; two concurrent runs on the same path race and the last writer
//! wins.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info, info_span};

use crate::error::StickerError;
use crate::rules::{RuleEdit, RuleSet};

// ============================================================================
// Content Hash
// ============================================================================

/// SHA-256 hash of a buffer, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA-256 hash of the given bytes, returning hex-encoded string.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Report
// ============================================================================

/// Whether `rewrite_file` writes its result back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RewriteMode {
    /// Overwrite the file in place.
    #[default]
    Apply,
    /// Compute the report only.
    DryRun,
}

/// Number of replacements one rule made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCount {
    pub rule: String,
    pub count: usize,
}

/// Everything a rewrite run produced.
#[derive(Debug, Clone)]
pub struct RewriteReport {
    /// Snapshot of the buffer as read.
    pub original: String,
    /// Buffer after the last rule.
    pub rewritten: String,
    /// Every replacement, grouped by rule in application order.
    pub edits: Vec<RuleEdit>,
    /// Per-rule replacement counts, one entry per rule including zeros.
    pub counts: Vec<RuleCount>,
    pub before_hash: ContentHash,
    pub after_hash: ContentHash,
    /// True if the file was written.
    pub written: bool,
}

impl RewriteReport {
    /// True if any rule changed the buffer.
    pub fn changed(&self) -> bool {
        self.original != self.rewritten
    }

    /// Total number of replacements.
    pub fn total_edits(&self) -> usize {
        self.edits.len()
    }
}

// ============================================================================
// Rewriter
// ============================================================================

/// Applies a `RuleSet` to text and files.
#[derive(Debug, Clone)]
pub struct Rewriter {
    rules: RuleSet,
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::stickers()
    }
}

impl Rewriter {
    pub fn new(rules: RuleSet) -> Self {
        Rewriter { rules }
    }

    /// Rewriter for the sticker manifest migration.
    pub fn stickers() -> Self {
        Rewriter::new(RuleSet::stickers())
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Run every rule over `text` in order.
    pub fn rewrite_str(&self, text: &str) -> RewriteReport {
        let mut current = text.to_string();
        let mut edits = Vec::new();
        let mut counts = Vec::with_capacity(self.rules.len());

        for rule in self.rules.rules() {
            let outcome = rule.apply(&current);
            debug!(rule = rule.name(), hits = outcome.edits.len(), "applied rule");
            counts.push(RuleCount {
                rule: rule.name().to_string(),
                count: outcome.edits.len(),
            });
            current = outcome.text;
            edits.extend(outcome.edits);
        }

        RewriteReport {
            before_hash: ContentHash::compute(text.as_bytes()),
            after_hash: ContentHash::compute(current.as_bytes()),
            original: text.to_string(),
            rewritten: current,
            edits,
            counts,
            written: false,
        }
    }

    /// Read `path`, rewrite it, and in `Apply` mode write it back.
    ///
    /// The file is written even when no rule matched.
    pub fn rewrite_file(
        &self,
        path: &Path,
        mode: RewriteMode,
    ) -> Result<RewriteReport, StickerError> {
        let _span = info_span!("rewrite_file", path = %path.display()).entered();

        let bytes = fs::read(path).map_err(|e| StickerError::read_failure(path, e))?;
        let text = String::from_utf8(bytes).map_err(|_| StickerError::InvalidEncoding {
            path: path.to_path_buf(),
        })?;

        let mut report = self.rewrite_str(&text);

        if mode == RewriteMode::Apply {
            atomic_write(path, report.rewritten.as_bytes())
                .map_err(|e| StickerError::write_failure(path, e))?;
            report.written = true;
        }

        info!(
            edits = report.total_edits(),
            written = report.written,
            "rewrite complete"
        );
        Ok(report)
    }
}

// ============================================================================
// Atomic File Operations
// ============================================================================

/// Write content to a file atomically using temp + rename.
///
/// Readers see either the old or the new content, never a partial write.
/// The temp file lives next to `path` so the rename stays on one filesystem,
/// and it takes over the target's permissions before the rename.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    atomic_write_with(path, content, |file, content| file.write_all(content))
}

fn atomic_write_with<F>(path: &Path, content: &[u8], write: F) -> io::Result<()>
where
    F: FnOnce(&mut fs::File, &[u8]) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();

    // Dropping the temp file on any early return removes it.
    let mut temp = NamedTempFile::new_in(dir)?;
    write(temp.as_file_mut(), content)?;
    temp.as_file().sync_all()?;
    temp.as_file().set_permissions(permissions)?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"const STICKERS = [
    { id: 'c1', image: '/img/stickers/common/ace.png' },
    { id: 'r1', image: '/img/stickers/rare/01_Muhammad_Ali_Boxe_GOLD.png' },
    { id: 'l1', image: '/img/stickers/legendary/eline.png' },
    { id: 'l2', image: '/img/stickers/legendary/coach_marc.png' },
    { id: 'l3', image: '/img/stickers/legendary/team_collectif.png' },
];
"#;

    mod rewrite_str {
        use super::*;

        #[test]
        fn applies_all_rules() {
            let report = Rewriter::stickers().rewrite_str(MANIFEST);
            let out = &report.rewritten;
            assert!(out.contains("'/img/stickers/common/ace.webp'"));
            assert!(out.contains("'/img/stickers/rare/01_Muhammad_Ali_Boxe_GOLD.webp'"));
            assert!(out.contains("'/img/stickers/legendary/eline_chevrollier.webp'"));
            assert!(out.contains("'/img/stickers/legendary/coach_marc.png'"));
            assert!(out.contains("'/img/stickers/legendary/team_collectif.png'"));
            assert_eq!(report.total_edits(), 3);
            assert!(report.changed());
        }

        #[test]
        fn counts_cover_every_rule() {
            let report = Rewriter::stickers().rewrite_str(MANIFEST);
            let counts: Vec<_> = report
                .counts
                .iter()
                .map(|c| (c.rule.as_str(), c.count))
                .collect();
            assert_eq!(
                counts,
                vec![
                    ("common-webp", 1),
                    ("rare-webp", 1),
                    ("legendary-eline", 1),
                    ("legendary-nine", 0),
                    ("legendary-coach-olivier", 0),
                    ("legendary-coach-alexis", 0),
                ]
            );
        }

        #[test]
        fn second_pass_is_a_no_op() {
            let rewriter = Rewriter::stickers();
            let first = rewriter.rewrite_str(MANIFEST);
            let second = rewriter.rewrite_str(&first.rewritten);
            assert_eq!(second.rewritten, first.rewritten);
            assert_eq!(second.total_edits(), 0);
            assert!(!second.changed());
            assert_eq!(second.before_hash, second.after_hash);
        }

        #[test]
        fn non_matching_text_unchanged() {
            let input = "const x = '/img/logo.png';\n";
            let report = Rewriter::stickers().rewrite_str(input);
            assert_eq!(report.rewritten, input);
            assert!(!report.changed());
        }

        #[test]
        fn edit_lines_match_original() {
            let report = Rewriter::stickers().rewrite_str(MANIFEST);
            let lines: Vec<_> = report.edits.iter().map(|e| e.line).collect();
            assert_eq!(lines, vec![2, 3, 4]);
        }
    }

    mod rewrite_file {
        use super::*;

        #[test]
        fn apply_writes_back() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("stickers.js");
            fs::write(&path, MANIFEST).unwrap();

            let report = Rewriter::stickers()
                .rewrite_file(&path, RewriteMode::Apply)
                .unwrap();

            assert!(report.written);
            assert_eq!(fs::read_to_string(&path).unwrap(), report.rewritten);
            assert_eq!(
                ContentHash::compute(fs::read(&path).unwrap().as_slice()),
                report.after_hash
            );
        }

        #[test]
        fn dry_run_leaves_file_alone() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("stickers.js");
            fs::write(&path, MANIFEST).unwrap();

            let dry = Rewriter::stickers()
                .rewrite_file(&path, RewriteMode::DryRun)
                .unwrap();

            assert!(!dry.written);
            assert!(dry.changed());
            assert_eq!(fs::read_to_string(&path).unwrap(), MANIFEST);

            let applied = Rewriter::stickers()
                .rewrite_file(&path, RewriteMode::Apply)
                .unwrap();
            assert_eq!(applied.rewritten, dry.rewritten);
            assert_eq!(applied.edits, dry.edits);
        }

        #[test]
        fn missing_file_is_read_failure() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("missing.js");

            let err = Rewriter::stickers()
                .rewrite_file(&path, RewriteMode::Apply)
                .unwrap_err();

            assert!(matches!(err, StickerError::ReadFailure { .. }));
            assert!(!path.exists());
        }

        #[test]
        fn non_utf8_is_invalid_encoding() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("stickers.js");
            fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

            let err = Rewriter::stickers()
                .rewrite_file(&path, RewriteMode::Apply)
                .unwrap_err();

            assert!(matches!(err, StickerError::InvalidEncoding { .. }));
        }

        #[test]
        fn failed_write_keeps_original_bytes() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("stickers.js");
            fs::write(&path, MANIFEST).unwrap();
            let rewritten = Rewriter::stickers().rewrite_str(MANIFEST).rewritten;

            // Disk fills up halfway through the new content.
            let result = atomic_write_with(&path, rewritten.as_bytes(), |file, content| {
                file.write_all(&content[..content.len() / 2])?;
                Err(io::Error::other("no space left on device"))
            });

            assert_eq!(result.unwrap_err().to_string(), "no space left on device");
            assert_eq!(fs::read_to_string(&path).unwrap(), MANIFEST);
            let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
            assert_eq!(leftovers.len(), 1, "temp file left behind");
        }

        #[cfg(unix)]
        #[test]
        fn unwritable_directory_is_write_failure() {
            use std::os::unix::fs::PermissionsExt;

            let dir = TempDir::new().unwrap();
            let path = dir.path().join("stickers.js");
            fs::write(&path, MANIFEST).unwrap();
            fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o555)).unwrap();

            // Privileged users ignore directory permissions.
            if fs::write(dir.path().join("canary"), b"").is_ok() {
                fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();
                return;
            }

            let err = Rewriter::stickers()
                .rewrite_file(&path, RewriteMode::Apply)
                .unwrap_err();
            fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();

            assert!(matches!(err, StickerError::WriteFailure { .. }));
            assert_eq!(err.error_code().code(), 4);
            assert_eq!(fs::read_to_string(&path).unwrap(), MANIFEST);
        }

        #[cfg(unix)]
        #[test]
        fn apply_keeps_file_permissions() {
            use std::os::unix::fs::PermissionsExt;

            let dir = TempDir::new().unwrap();
            let path = dir.path().join("stickers.js");
            fs::write(&path, MANIFEST).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

            Rewriter::stickers()
                .rewrite_file(&path, RewriteMode::Apply)
                .unwrap();

            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o644);
        }

        #[test]
        fn apply_leaves_no_temp_file() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("stickers.js");
            fs::write(&path, MANIFEST).unwrap();

            let report = Rewriter::stickers()
                .rewrite_file(&path, RewriteMode::Apply)
                .unwrap();

            assert!(report.written);
            let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
            assert_eq!(leftovers.len(), 1);
        }

        #[test]
        fn directory_is_read_failure() {
            let dir = TempDir::new().unwrap();
            let err = Rewriter::stickers()
                .rewrite_file(dir.path(), RewriteMode::Apply)
                .unwrap_err();
            assert!(matches!(err, StickerError::ReadFailure { .. }));
        }
    }

    #[test]
    fn content_hash_is_sha256_hex() {
        let hash = ContentHash::compute(b"");
        assert_eq!(
            hash.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
