//! Error types and error code constants for stickerfix.
//!
//! `StickerError` is the single error type surfaced by the rewriter. Every
//! variant is fatal: the run aborts and the process exits with the code
//! returned by `OutputErrorCode::from(&err)`.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments or input that cannot be treated as text
//! - `3`: Read failure (file missing or unreadable)
//! - `4`: Write failure (permission or disk error)

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments (reported by clap with the same code), or a source
    /// file that is not UTF-8.
    InvalidArguments = 2,
    /// The source file could not be read.
    ReadFailure = 3,
    /// The rewritten buffer could not be written back.
    WriteFailure = 4,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Error type for a rewrite run.
#[derive(Debug, Error)]
pub enum StickerError {
    /// Source path missing or unreadable.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file was read but its bytes are not valid UTF-8.
    #[error("{} is not valid UTF-8 text", .path.display())]
    InvalidEncoding { path: PathBuf },

    /// Destination unwritable.
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&StickerError> for OutputErrorCode {
    fn from(err: &StickerError) -> Self {
        match err {
            StickerError::InvalidEncoding { .. } => OutputErrorCode::InvalidArguments,
            StickerError::ReadFailure { .. } => OutputErrorCode::ReadFailure,
            StickerError::WriteFailure { .. } => OutputErrorCode::WriteFailure,
        }
    }
}

impl From<StickerError> for OutputErrorCode {
    fn from(err: StickerError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl StickerError {
    /// Create a read failure for `path`.
    pub fn read_failure(path: &Path, source: io::Error) -> Self {
        StickerError::ReadFailure {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a write failure for `path`.
    pub fn write_failure(path: &Path, source: io::Error) -> Self {
        StickerError::WriteFailure {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
