//! Core infrastructure for stickerfix.
//!
//! This crate provides:
//! - The compiled-in rule set for the sticker manifest migration
//! - The rewriter that applies it to a buffer or a file
//! - Error types and error codes
//! - JSON output types for CLI responses
//! - Text position utilities and diff generation

pub mod diff;
pub mod error;
pub mod output;
pub mod rewrite;
pub mod rules;
pub mod text;
