//! CLI front door.
//!
//! `Cli` is the parsed command line. `run` executes it against writers for
//! stdout and stderr and returns the process exit code, so integration tests
//! can drive the whole tool without spawning a process.
//!
//! ## Output
//!
//! - `--format text` (default): the completion message after a write, or a
//!   unified diff and summary line for `--dry-run`. Errors go to stderr.
//! - `--format json`: a `RewriteResponse` or `ErrorResponse` on stdout.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use stickerfix_core::diff::generate_unified_diff;
use stickerfix_core::error::{OutputErrorCode, StickerError};
use stickerfix_core::output::{emit_response, ErrorResponse, RewriteResponse};
use stickerfix_core::rewrite::{RewriteMode, RewriteReport, Rewriter};

/// Manifest location used when no path is given.
pub const DEFAULT_MANIFEST: &str = "public/js/stickers.js";

// ============================================================================
// CLI Structure
// ============================================================================

/// Convert sticker image paths in the manifest from `.png` to `.webp`.
///
/// Common and rare stickers switch extension; four legendary stickers are
/// renamed. The file is rewritten in place with no backup.
#[derive(Parser, Debug)]
#[command(name = "stickerfix", version, about = "Rewrite sticker image paths to .webp")]
pub struct Cli {
    /// Manifest file to rewrite.
    #[arg(env = "STICKERFIX_PATH", default_value = DEFAULT_MANIFEST)]
    pub path: PathBuf,

    /// Print the diff instead of writing the file.
    #[arg(long)]
    pub dry_run: bool,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Log level for tracing output.
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}

/// Output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default).
    #[default]
    Text,
    /// Full JSON response.
    Json,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

// ============================================================================
// Execution
// ============================================================================

/// Run the rewrite described by `cli`, reporting to `out` and `err`.
///
/// Returns the process exit code: `0` on success, otherwise the
/// `OutputErrorCode` of the failure.
pub fn run(cli: &Cli, out: &mut impl Write, err: &mut impl Write) -> u8 {
    match execute(cli, out) {
        Ok(_) => 0,
        Err(error) => {
            tracing::error!(%error, "rewrite failed");
            let code = OutputErrorCode::from(&error);
            // Nothing left to report to if the writers fail too.
            let _ = match cli.format {
                OutputFormat::Json => emit_response(&ErrorResponse::from_error(&error), out),
                OutputFormat::Text => writeln!(err, "error: {}", error),
            };
            code.code()
        }
    }
}

/// Rewrite the manifest and print the result.
pub fn execute(cli: &Cli, out: &mut impl Write) -> Result<RewriteReport, StickerError> {
    let mode = if cli.dry_run {
        RewriteMode::DryRun
    } else {
        RewriteMode::Apply
    };
    let report = Rewriter::stickers().rewrite_file(&cli.path, mode)?;

    let shown = cli.path.display().to_string();
    let printed = match cli.format {
        OutputFormat::Json => {
            emit_response(&RewriteResponse::from_report(shown, &report, cli.dry_run), out)
        }
        OutputFormat::Text if cli.dry_run => {
            let diff = generate_unified_diff(&shown, &report.original, &report.rewritten);
            write!(out, "{}", diff).and_then(|()| {
                writeln!(
                    out,
                    "{} replacement(s) would be made in {}.",
                    report.total_edits(),
                    file_name(&cli.path)
                )
            })
        }
        OutputFormat::Text => writeln!(out, "Updated {} successfully.", file_name(&cli.path)),
    };
    // The file is already written; a closed stdout is not a rewrite failure.
    if let Err(e) = printed {
        tracing::warn!(error = %e, "failed to print result");
    }

    Ok(report)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Tests
// ============================================================================
