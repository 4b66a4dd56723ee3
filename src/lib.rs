//! stickerfix: one-shot rewrite of sticker image paths in the manifest.
//!
//! Converts `.png` paths under `/img/stickers/common/` and
//! `/img/stickers/rare/` to `.webp` and renames four legendary stickers.

// Core infrastructure - re-exported from stickerfix-core
pub use stickerfix_core::diff;
pub use stickerfix_core::error;
pub use stickerfix_core::output;
pub use stickerfix_core::rewrite;
pub use stickerfix_core::rules;
pub use stickerfix_core::text;

// Front door
pub mod cli;
