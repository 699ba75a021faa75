//! Encoding and decoding over a loaded vocabulary.

pub mod byte_level;

pub use byte_level::{merge_boundaries, ByteLevelEncoder};
