//! JSON output types for CLI responses.
//!
//! All responses carry `status` and `schema_version`. Errors are reported as
//! an `ErrorResponse` whose `error.code` equals the process exit code.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, StickerError};
use crate::rewrite::{RewriteReport, RuleCount};
use crate::rules::RuleEdit;

/// Current output schema version.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Responses
// ============================================================================

/// Result of one rewrite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteResponse {
    pub status: String,
    pub schema_version: String,
    /// Path as given on the command line.
    pub file: String,
    pub dry_run: bool,
    /// True if any rule changed the buffer.
    pub changed: bool,
    pub before_hash: String,
    pub after_hash: String,
    /// Replacement count per rule, in application order.
    pub rules: Vec<RuleCount>,
    pub edits: Vec<RuleEdit>,
    /// Unified diff of the change, present for dry runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl RewriteResponse {
    pub fn from_report(file: impl Into<String>, report: &RewriteReport, dry_run: bool) -> Self {
        let file = file.into();
        let diff = dry_run.then(|| {
            crate::diff::generate_unified_diff(&file, &report.original, &report.rewritten)
        });
        RewriteResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file,
            dry_run,
            changed: report.changed(),
            before_hash: report.before_hash.to_string(),
            after_hash: report.after_hash.to_string(),
            rules: report.counts.clone(),
            edits: report.edits.clone(),
            diff,
        }
    }
}

/// Error information included in error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code, equal to the exit code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Path the error refers to.
    pub file: String,
}

impl ErrorInfo {
    /// Create from a StickerError.
    pub fn from_error(err: &StickerError) -> Self {
        let path = match err {
            StickerError::ReadFailure { path, .. }
            | StickerError::WriteFailure { path, .. }
            | StickerError::InvalidEncoding { path } => path,
        };
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            file: path.display().to_string(),
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &StickerError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
