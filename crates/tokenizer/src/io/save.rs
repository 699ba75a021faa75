//! Save functionality for vocabularies.
//!
//! A vocabulary is saved as a directory holding `vocab.tiktoken` (every
//! ranked piece in ascending rank order) and `special_tokens.json`. Loading
//! the directory back yields the same IDs, since IDs only depend on ranks
//! and special-token order.

use super::format::{SerializedSpecialTokens, SPECIAL_TOKENS_FILE, TIKTOKEN_FILE};
use base64::{engine::general_purpose::STANDARD, Engine};
use mergerank_core::{Result, TokenizerError, Vocabulary};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Vocabulary saver - handles writing vocabulary files.
pub struct TokenizerSaver<'a> {
    /// Vocabulary reference
    vocab: &'a Vocabulary,
}

impl<'a> TokenizerSaver<'a> {
    /// Create a new saver.
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Save the vocabulary to a directory.
    ///
    /// # Arguments
    /// * `path` - Directory path to save to (created if missing)
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|e| {
            TokenizerError::Save(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))
        })?;

        self.save_tiktoken(&path.join(TIKTOKEN_FILE))?;
        self.save_special_tokens(&path.join(SPECIAL_TOKENS_FILE))?;

        tracing::debug!(path = %path.display(), entries = self.vocab.len(), "saved vocabulary");
        Ok(())
    }

    /// Write the merge table as a tiktoken file.
    pub fn save_tiktoken(&self, file_path: &Path) -> Result<()> {
        let file = File::create(file_path).map_err(|e| TokenizerError::io(file_path, e))?;
        let mut writer = BufWriter::new(file);

        for (bytes, rank) in self.vocab.ranked_pieces() {
            writeln!(writer, "{} {}", STANDARD.encode(bytes), rank)
                .map_err(|e| TokenizerError::io(file_path, e))?;
        }

        writer.flush().map_err(|e| TokenizerError::io(file_path, e))
    }

    /// Write the special tokens, in ID order, as a JSON array.
    pub fn save_special_tokens(&self, file_path: &Path) -> Result<()> {
        let file = File::create(file_path).map_err(|e| TokenizerError::io(file_path, e))?;
        let special: SerializedSpecialTokens = self
            .vocab
            .special_tokens()
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &special)?;
        writer.flush().map_err(|e| TokenizerError::io(file_path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::TokenizerLoader;

    fn sample_vocab() -> Vocabulary {
        let table = vec![
            (b"e".to_vec(), 0u32),
            (b"er".to_vec(), 5),
            (b" t".to_vec(), 3),
            (b" th".to_vec(), 9),
        ];
        Vocabulary::from_merge_table(table, ["<|endoftext|>", "<|pad|>"]).unwrap()
    }

    #[test]
    fn test_save_writes_rank_order() {
        let dir = tempfile::tempdir().unwrap();
        TokenizerSaver::new(&sample_vocab()).save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(TIKTOKEN_FILE)).unwrap();
        let ranks: Vec<&str> = content
            .lines()
            .map(|l| l.rsplit(' ').next().unwrap())
            .collect();
        assert_eq!(ranks, vec!["0", "3", "5", "9"]);
    }

    #[test]
    fn test_save_load_same_ids() {
        let vocab = sample_vocab();
        let dir = tempfile::tempdir().unwrap();
        TokenizerSaver::new(&vocab).save(dir.path()).unwrap();

        let loaded = TokenizerLoader::load(dir.path()).unwrap();

        assert_eq!(loaded.len(), vocab.len());
        for (id, entry) in vocab.entries() {
            assert_eq!(loaded.entry(id), Some(entry), "id {}", id);
        }
    }
}
