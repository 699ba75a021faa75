//! Core BPE data structures.
//!
//! This module contains the vocabulary, the merge-rank table and the merge
//! priority queue, independent of how text is split before merging.

pub mod merges;
pub mod priority;
pub mod vocab;

pub use merges::{MergeRanks, MergeStats, RankedPiece};
pub use priority::{MergeCandidate, MergeQueue};
pub use vocab::{SpecialTokens, VocabEntry, Vocabulary, VocabularyStats, BASE_VOCAB_SIZE};
