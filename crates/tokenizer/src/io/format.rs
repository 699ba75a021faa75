//! Format definitions for vocabulary files.
//!
//! Two on-disk layouts are understood:
//!
//! - a vocabulary directory: `vocab.tiktoken` (`<base64 piece> <rank>` per
//!   line) plus `special_tokens.json` (array of strings in ID order)
//! - a HuggingFace `tokenizer.json`, of which only `model.vocab` and
//!   `added_tokens` are read

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Merge table file inside a vocabulary directory.
pub const TIKTOKEN_FILE: &str = "vocab.tiktoken";

/// Special token file inside a vocabulary directory.
pub const SPECIAL_TOKENS_FILE: &str = "special_tokens.json";

/// Vocabulary file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// A single tiktoken merge table file
    Tiktoken,
    /// A directory written by `TokenizerSaver`
    Directory,
    /// A HuggingFace `tokenizer.json`
    HuggingFace,
}

impl ModelFormat {
    /// Guess the format of a path.
    pub fn detect(path: &std::path::Path) -> Self {
        if path.is_dir() {
            ModelFormat::Directory
        } else if path.extension().is_some_and(|ext| ext == "json") {
            ModelFormat::HuggingFace
        } else {
            ModelFormat::Tiktoken
        }
    }
}

/// The parts of a HuggingFace `tokenizer.json` this crate reads.
#[derive(Debug, Clone, Deserialize)]
pub struct HuggingFaceFormat {
    /// The BPE model section
    pub model: HuggingFaceModel,
    /// Tokens added on top of the model vocabulary
    #[serde(default)]
    pub added_tokens: Vec<AddedToken>,
}

/// `model` section of a HuggingFace `tokenizer.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct HuggingFaceModel {
    /// Byte-level spelled token -> ID
    pub vocab: HashMap<String, u32>,
}

/// One entry of `added_tokens`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddedToken {
    /// Token ID in the original vocabulary
    pub id: u32,
    /// Literal token text
    pub content: String,
    /// Whether the token is a control token
    #[serde(default)]
    pub special: bool,
}

/// `special_tokens.json` contents.
pub type SerializedSpecialTokens = Vec<String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_huggingface_subset() {
        let json = r#"{
            "version": "1.0",
            "added_tokens": [
                {"id": 5, "content": "<|eot|>", "special": true, "normalized": false}
            ],
            "model": {"type": "BPE", "vocab": {"a": 0, "Ġa": 1}, "merges": []}
        }"#;

        let parsed: HuggingFaceFormat = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.model.vocab.get("a"), Some(&0));
        assert_eq!(parsed.model.vocab.get("\u{0120}a"), Some(&1));
        assert_eq!(parsed.added_tokens.len(), 1);
        assert!(parsed.added_tokens[0].special);
    }

    #[test]
    fn test_added_tokens_default_empty() {
        let json = r#"{"model": {"vocab": {}}}"#;
        let parsed: HuggingFaceFormat = serde_json::from_str(json).unwrap();
        assert!(parsed.added_tokens.is_empty());
    }

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(
            ModelFormat::detect(std::path::Path::new("missing/tokenizer.json")),
            ModelFormat::HuggingFace
        );
        assert_eq!(
            ModelFormat::detect(std::path::Path::new("missing/cl100k_base.tiktoken")),
            ModelFormat::Tiktoken
        );
    }
}
