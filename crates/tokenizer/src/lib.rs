//! Mergerank-tokenizer - High-level tokenizer API
//!
//! This crate puts a pre-tokenizer, an optional normalizer and a chunk
//! cache in front of the `mergerank-core` merger, and reads and writes
//! vocabulary files.
//!
//! # Features
//!
//! - Ordered pre-tokenization rules (contractions, words, digits, symbols,
//!   newlines, whitespace) with exact chunk coverage
//! - Ordinary and special-token aware encoding
//! - Batch and chunk-parallel encoding on the rayon pool
//! - Loading tiktoken files, saved directories and HuggingFace
//!   `tokenizer.json`; saving in the tiktoken layout
//!
//! # Example
//!
//! ```rust
//! use mergerank_tokenizer::{AllowedSpecial, Tokenizer, Vocabulary};
//!
//! let vocab = Vocabulary::from_merge_table(
//!     vec![(b"vo".to_vec(), 0), (b"us".to_vec(), 1)],
//!     ["<|endoftext|>"],
//! )?;
//! let tokenizer = Tokenizer::builder().vocabulary(vocab).build()?;
//!
//! let ids = tokenizer.encode_with_special_tokens("vous<|endoftext|>", AllowedSpecial::All)?;
//! assert_eq!(ids, vec![256, 257, 258]);
//! assert_eq!(tokenizer.decode(&ids)?, "vous<|endoftext|>");
//! # Ok::<(), mergerank_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use mergerank_core::{Result, TokenizerError, VocabEntry, Vocabulary, VocabularyStats};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{Tokenizer, TokenizerBuilder, TokenizerConfig};

// IO/Serialization
pub mod io;
pub use io::{HuggingFaceFormat, ModelFormat, TokenizerLoader, TokenizerSaver};

// Pre-tokenization
pub mod pre_tokenizer;
pub use pre_tokenizer::{
    AllowedSpecial, Chunk, NormalizationForm, Normalizer, SplitRule, Splitter,
};

// Utilities
pub mod utils;
pub use utils::{CacheStats, EncodingCache};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
