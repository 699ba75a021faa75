//! Pre-tokenization pipeline.
//!
//! This module provides the operations applied before BPE merging:
//! special-token extraction, optional normalization and chunk splitting.

pub mod normalize;
pub mod special;
pub mod split;

pub use normalize::{NormalizationForm, Normalizer};
pub use special::{AllowedSpecial, Segment, SpecialTokenMatcher};
pub use split::{Chunk, Chunks, SplitRule, Splitter};
