//! The fixed rule set applied to the sticker manifest.
//!
//! Two kinds of rule exist:
//!
//! - **Prefix rules** match one path token that starts with a folder prefix
//!   and ends in an extension, and rewrite only the extension.
//! - **Literal rules** map one exact legacy path to its renamed equivalent.
//!
//! The set is compiled in. `team_collectif` has no counterpart on disk and is
//! left alone.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::text::{byte_offset_to_position, Span};

/// Folder whose stickers are converted wholesale.
pub const COMMON_PREFIX: &str = "/img/stickers/common/";
/// Folder whose stickers are converted wholesale.
pub const RARE_PREFIX: &str = "/img/stickers/rare/";

const FROM_EXT: &str = ".png";
const TO_EXT: &str = ".webp";

/// Legendary stickers that were renamed as well as converted.
pub const LEGENDARY_RENAMES: [(&str, &str); 4] = [
    (
        "/img/stickers/legendary/eline.png",
        "/img/stickers/legendary/eline_chevrollier.webp",
    ),
    (
        "/img/stickers/legendary/nine.png",
        "/img/stickers/legendary/nine_wester.webp",
    ),
    (
        "/img/stickers/legendary/coach_olivier.png",
        "/img/stickers/legendary/olivier_bouvet.webp",
    ),
    (
        "/img/stickers/legendary/coach_alexis.png",
        "/img/stickers/legendary/alexis_mustiere.webp",
    ),
];

// The token between prefix and extension stops at quotes, whitespace and
// path separators so that two paths on one line stay two matches. Compiled
// once per process; every `PrefixRule` borrows the same instance.
static COMMON_PNG: LazyLock<Regex> = LazyLock::new(|| prefix_pattern(COMMON_PREFIX, FROM_EXT));
static RARE_PNG: LazyLock<Regex> = LazyLock::new(|| prefix_pattern(RARE_PREFIX, FROM_EXT));

fn prefix_pattern(prefix: &str, ext: &str) -> Regex {
    let pattern = format!(
        r#"{}[^"'\s/]*{}\b"#,
        regex::escape(prefix),
        regex::escape(ext)
    );
    Regex::new(&pattern).unwrap()
}

// ============================================================================
// Rule Types
// ============================================================================

/// Rewrites the extension of every path token under a folder prefix.
#[derive(Debug, Clone)]
pub struct PrefixRule {
    name: &'static str,
    prefix: &'static str,
    pattern: &'static Regex,
    from_ext: &'static str,
    to_ext: &'static str,
}

/// Replaces one exact string with another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralRule {
    name: &'static str,
    old: &'static str,
    new: &'static str,
}

/// A single transformation step.
#[derive(Debug, Clone)]
pub enum Rule {
    Prefix(PrefixRule),
    Literal(LiteralRule),
}

/// One replacement made by a rule.
///
/// `span`, `line` and `col` locate `old_text` in the buffer as the rule saw
/// it. Rules never add or remove newlines, so `line` is also valid in the
/// original and the final text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEdit {
    /// Name of the rule that made the edit.
    pub rule: String,
    /// Byte range of `old_text`.
    pub span: Span,
    /// Replaced text.
    pub old_text: String,
    /// Replacement text.
    pub new_text: String,
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column.
    pub col: u32,
}

/// Result of applying one rule to a buffer.
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    /// The buffer after the rule ran.
    pub text: String,
    /// Replacements in buffer order.
    pub edits: Vec<RuleEdit>,
}

impl PrefixRule {
    /// The folder prefix this rule is anchored on.
    pub fn prefix(&self) -> &str {
        self.prefix
    }

    fn apply(&self, text: &str) -> RuleOutcome {
        let mut out = String::with_capacity(text.len() + 64);
        let mut edits = Vec::new();
        let mut last = 0;

        for m in self.pattern.find_iter(text) {
            let old = m.as_str();
            let stem = &old[..old.len() - self.from_ext.len()];
            let new = format!("{}{}", stem, self.to_ext);

            out.push_str(&text[last..m.start()]);
            out.push_str(&new);
            last = m.end();

            let (line, col) = byte_offset_to_position(text, m.start());
            edits.push(RuleEdit {
                rule: self.name.to_string(),
                span: Span::new(m.start(), m.end()),
                old_text: old.to_string(),
                new_text: new,
                line,
                col,
            });
        }
        out.push_str(&text[last..]);

        RuleOutcome { text: out, edits }
    }
}

impl LiteralRule {
    /// The legacy path this rule looks for.
    pub fn old(&self) -> &str {
        self.old
    }

    /// The path it is replaced with.
    pub fn new_path(&self) -> &str {
        self.new
    }

    fn apply(&self, text: &str) -> RuleOutcome {
        let mut edits = Vec::new();
        for (start, old) in text.match_indices(self.old) {
            let (line, col) = byte_offset_to_position(text, start);
            edits.push(RuleEdit {
                rule: self.name.to_string(),
                span: Span::new(start, start + old.len()),
                old_text: old.to_string(),
                new_text: self.new.to_string(),
                line,
                col,
            });
        }

        let text = if edits.is_empty() {
            text.to_string()
        } else {
            text.replace(self.old, self.new)
        };
        RuleOutcome { text, edits }
    }
}

impl Rule {
    /// Stable name used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Prefix(rule) => rule.name,
            Rule::Literal(rule) => rule.name,
        }
    }

    /// Apply this rule to `text`.
    pub fn apply(&self, text: &str) -> RuleOutcome {
        match self {
            Rule::Prefix(rule) => rule.apply(text),
            Rule::Literal(rule) => rule.apply(text),
        }
    }
}

// ============================================================================
// Rule Set
// ============================================================================

/// An ordered list of rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// The sticker manifest migration: common and rare `.png` to `.webp`,
    /// then the legendary renames.
    pub fn stickers() -> Self {
        let mut rules = vec![
            Rule::Prefix(PrefixRule {
                name: "common-webp",
                prefix: COMMON_PREFIX,
                pattern: &COMMON_PNG,
                from_ext: FROM_EXT,
                to_ext: TO_EXT,
            }),
            Rule::Prefix(PrefixRule {
                name: "rare-webp",
                prefix: RARE_PREFIX,
                pattern: &RARE_PNG,
                from_ext: FROM_EXT,
                to_ext: TO_EXT,
            }),
        ];

        let names = [
            "legendary-eline",
            "legendary-nine",
            "legendary-coach-olivier",
            "legendary-coach-alexis",
        ];
        for (name, (old, new)) in names.into_iter().zip(LEGENDARY_RENAMES) {
            rules.push(Rule::Literal(LiteralRule { name, old, new }));
        }

        RuleSet { rules }
    }

    /// Rules in application order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
