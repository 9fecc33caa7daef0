//! Dictionary files and their indexes.
//!
//! `Dictionary` owns the mapped bytes of an EDICT-style text file, the codec
//! detected for it, and the currently loaded `SortedIndex`.

mod dictionary;
mod format;
#[cfg(test)]
mod tests;

pub use dictionary::{Dictionary, WORD_END_DELIMITERS, WORD_START_DELIMITERS};
pub use format::validate_format;

use std::io;

/// Unified error type for loading dictionaries and their index files.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("unsupported encoding (neither UTF-8 nor EUC-JP)")]
    UnsupportedEncoding,

    #[error("invalid dictionary format: {0}")]
    InvalidFormat(String),

    #[error("dictionary too large for 32-bit offsets: {0} bytes")]
    TooLarge(u64),

    #[error("dictionary has no index")]
    MissingIndex,

    #[error("invalid index header (too short)")]
    InvalidHeader,

    #[error("invalid index magic bytes (expected SSIX)")]
    InvalidMagic,

    #[error("unsupported index version: {0}")]
    UnsupportedVersion(u8),

    #[error("stale index: {0}")]
    StaleIndex(String),

    #[error("parse error: {0}")]
    Parse(String),
}
