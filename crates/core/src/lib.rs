//! Mergerank-core - Core byte-level BPE engine
//!
//! This crate provides the vocabulary, merge and decode machinery of a
//! rank-driven byte-pair-encoding tokenizer, independent of how text is
//! split into chunks before merging.
//!
//! # Features
//!
//! - Deterministic dense ID layout: 256 base bytes, merged pieces by rank,
//!   then special tokens
//! - Global lowest-rank-first merging in `O(L log L)` per chunk
//! - Tagged vocabulary entries keeping special tokens apart from pieces
//! - Error handling with detailed diagnostics
//!
//! # Example
//!
//! ```rust
//! use mergerank_core::{ByteLevelEncoder, Vocabulary};
//! use std::sync::Arc;
//!
//! let vocab = Vocabulary::from_merge_table(
//!     vec![(b"vo".to_vec(), 0), (b"us".to_vec(), 1)],
//!     ["<|endoftext|>"],
//! )?;
//! let encoder = ByteLevelEncoder::new(Arc::new(vocab));
//!
//! let ids = encoder.encode_chunk("vous")?;
//! assert_eq!(ids, vec![256, 257]);
//! assert_eq!(encoder.decode(&ids)?, "vous");
//! # Ok::<(), mergerank_core::TokenizerError>(())
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Core BPE data structures
pub mod core;
pub use core::{
    MergeCandidate, MergeQueue, MergeRanks, MergeStats, RankedPiece, SpecialTokens, VocabEntry,
    Vocabulary, VocabularyStats, BASE_VOCAB_SIZE,
};

// Merging and decoding
pub mod encoding;
pub use encoding::{merge_boundaries, ByteLevelEncoder};
