//! Load functionality for vocabularies.
//!
//! Every loader ends in [`Vocabulary::from_merge_table`], so all of its
//! validation (duplicate ranks, empty pieces, special-token collisions)
//! applies whatever the source format.

use super::byte_alphabet::alphabet_to_bytes;
use super::format::{
    HuggingFaceFormat, ModelFormat, SerializedSpecialTokens, SPECIAL_TOKENS_FILE, TIKTOKEN_FILE,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use mergerank_core::{Result, TokenizerError, Vocabulary};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A merge table as read from disk: `(piece bytes, rank)` in file order.
pub type MergeTable = Vec<(Vec<u8>, u32)>;

/// Vocabulary loader - handles reading vocabulary files.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Parse tiktoken merge-table data.
    ///
    /// Format: `<base64 piece> <rank>` per line, blank lines ignored.
    pub fn parse_tiktoken(data: &[u8]) -> Result<MergeTable> {
        let mut table = Vec::new();

        for (line_num, line) in data.split(|&b| b == b'\n').enumerate() {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let bad_line = |what: &str| {
                TokenizerError::Load(format!("line {}: {}", line_num + 1, what))
            };

            let space_pos = line
                .iter()
                .rposition(|&b| b == b' ')
                .ok_or_else(|| bad_line("missing space separator"))?;

            let piece = STANDARD
                .decode(&line[..space_pos])
                .map_err(|e| bad_line(&format!("invalid base64: {}", e)))?;

            let rank = std::str::from_utf8(&line[space_pos + 1..])
                .ok()
                .and_then(|s| s.trim().parse::<u32>().ok())
                .ok_or_else(|| bad_line("invalid rank"))?;

            table.push((piece, rank));
        }

        Ok(table)
    }

    /// Read a tiktoken merge-table file.
    pub fn read_tiktoken_file(path: &Path) -> Result<MergeTable> {
        let data = std::fs::read(path).map_err(|e| TokenizerError::io(path, e))?;
        let table = Self::parse_tiktoken(&data)?;

        tracing::debug!(path = %path.display(), pieces = table.len(), "read tiktoken file");
        Ok(table)
    }

    /// Load a vocabulary from a tiktoken file and a list of special tokens.
    pub fn load_tiktoken<S, T>(path: &Path, special_tokens: S) -> Result<Vocabulary>
    where
        S: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let table = Self::read_tiktoken_file(path)?;
        Vocabulary::from_merge_table(table, special_tokens)
    }

    /// Load a vocabulary directory written by `TokenizerSaver`.
    ///
    /// Expects `vocab.tiktoken` and, optionally, `special_tokens.json`.
    pub fn load(path: &Path) -> Result<Vocabulary> {
        let table = Self::read_tiktoken_file(&path.join(TIKTOKEN_FILE))?;

        let special_path = path.join(SPECIAL_TOKENS_FILE);
        let special: SerializedSpecialTokens = if special_path.exists() {
            let file = File::open(&special_path).map_err(|e| TokenizerError::io(&special_path, e))?;
            serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                TokenizerError::Load(format!("Failed to parse {}: {}", special_path.display(), e))
            })?
        } else {
            Vec::new()
        };

        Vocabulary::from_merge_table(table, special)
    }

    /// Load from a HuggingFace `tokenizer.json`.
    ///
    /// `model.vocab` keys are byte-level spelled pieces; each ID becomes
    /// the piece's rank. `added_tokens` flagged `special` become special
    /// tokens, ordered by their original ID. Other added tokens become
    /// ordinary pieces ranked by their ID.
    pub fn load_huggingface(path: &Path) -> Result<Vocabulary> {
        let file = File::open(path).map_err(|e| TokenizerError::io(path, e))?;
        let parsed: HuggingFaceFormat = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| TokenizerError::Load(format!("Failed to deserialize tokenizer: {}", e)))?;

        let (table, special) = Self::huggingface_table(&parsed)?;
        Vocabulary::from_merge_table(table, special)
    }

    /// Split a parsed `tokenizer.json` into a merge table and special tokens.
    fn huggingface_table(parsed: &HuggingFaceFormat) -> Result<(MergeTable, Vec<String>)> {
        let mut special_tokens: Vec<_> = parsed.added_tokens.iter().filter(|t| t.special).collect();
        special_tokens.sort_unstable_by_key(|t| t.id);
        let special: Vec<String> = special_tokens.iter().map(|t| t.content.clone()).collect();

        let mut table = Vec::with_capacity(parsed.model.vocab.len());
        for (spelled, &id) in &parsed.model.vocab {
            if special.iter().any(|s| s == spelled) {
                continue;
            }
            let bytes = alphabet_to_bytes(spelled).map_err(|ch| {
                TokenizerError::Load(format!(
                    "vocab entry {:?} uses {:?}, which is not a byte-level character",
                    spelled, ch
                ))
            })?;
            table.push((bytes, id));
        }

        for token in parsed.added_tokens.iter().filter(|t| !t.special) {
            let bytes = token.content.as_bytes();
            if !table.iter().any(|(piece, _)| piece.as_slice() == bytes) {
                table.push((bytes.to_vec(), token.id));
            }
        }

        tracing::debug!(
            pieces = table.len(),
            special = special.len(),
            "read huggingface vocabulary"
        );
        Ok((table, special))
    }

    /// Load a vocabulary, guessing the format from the path.
    ///
    /// `special_tokens` only applies to plain tiktoken files; the other
    /// formats carry their own.
    pub fn load_any<S, T>(path: &Path, special_tokens: S) -> Result<Vocabulary>
    where
        S: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        match ModelFormat::detect(path) {
            ModelFormat::Directory => Self::load(path),
            ModelFormat::HuggingFace => Self::load_huggingface(path),
            ModelFormat::Tiktoken => Self::load_tiktoken(path, special_tokens),
        }
    }
}
