//! Vocabulary file I/O.
//!
//! This module reads merge tables from tiktoken files, saved vocabulary
//! directories and HuggingFace `tokenizer.json` files, and writes
//! vocabulary directories.

pub mod byte_alphabet;
pub mod format;
pub mod load;
pub mod save;

pub use format::{HuggingFaceFormat, ModelFormat};
pub use load::{MergeTable, TokenizerLoader};
pub use save::TokenizerSaver;
