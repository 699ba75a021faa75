//! Error types for the BPE tokenizer library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tokenizer library.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Malformed or contradictory merge table, or a special-token collision
    #[error("Invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    /// A final merge symbol has no vocabulary entry.
    ///
    /// Only reachable when the base byte alphabet is incomplete.
    #[error("Unknown piece {bytes:?} in chunk {chunk:?}")]
    UnknownPiece { bytes: Vec<u8>, chunk: String },

    /// Unknown token ID
    #[error("Unknown token ID: {0}")]
    UnknownTokenId(u32),

    /// Decoded bytes are not valid UTF-8
    #[error("Decoded bytes are not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    /// Error loading a vocabulary file
    #[error("Load error: {0}")]
    Load(String),

    /// Error saving a vocabulary file
    #[error("Save error: {0}")]
    Save(String),

    /// I/O error with file context
    #[error("I/O error for {}: {err}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TokenizerError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
