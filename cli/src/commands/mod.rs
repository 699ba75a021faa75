//! CLI commands for the mergerank tokenizer.

pub mod benchmark;
pub mod decode;
pub mod encode;
pub mod inspect;
pub mod save;
pub mod split;

pub use benchmark::BenchmarkCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use inspect::InspectCommand;
pub use save::SaveCommand;
pub use split::SplitCommand;

use anyhow::{Context, Result};
use clap::Args;
use mergerank_tokenizer::{NormalizationForm, Tokenizer, TokenizerConfig};
use std::io::Read;
use std::path::PathBuf;

/// Vocabulary arguments shared by every command.
#[derive(Args)]
pub struct VocabArgs {
    /// Tiktoken file, saved vocabulary directory or tokenizer.json
    #[arg(long)]
    pub vocab: PathBuf,

    /// Special token for tiktoken files (repeatable, in ID order)
    #[arg(long = "special")]
    pub special: Vec<String>,

    /// Unicode normalization applied before splitting
    #[arg(long, default_value = "none")]
    pub normalize: NormalizationForm,

    /// Chunk cache capacity (0 disables the cache)
    #[arg(long, default_value_t = TokenizerConfig::default().cache_capacity)]
    pub cache_capacity: usize,
}

impl VocabArgs {
    /// Load the vocabulary and build a tokenizer over it.
    pub fn tokenizer(&self) -> Result<Tokenizer> {
        let vocab = mergerank_tokenizer::TokenizerLoader::load_any(&self.vocab, &self.special)
            .with_context(|| format!("failed to load vocabulary from {}", self.vocab.display()))?;

        let tokenizer = Tokenizer::builder()
            .vocabulary(vocab)
            .normalization(self.normalize)
            .cache_capacity(self.cache_capacity)
            .build()?;
        Ok(tokenizer)
    }
}

/// Read text from the argument, or from stdin when it is `-`.
pub fn read_input(input: &str) -> Result<String> {
    if input != "-" {
        return Ok(input.to_string());
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read stdin")?;
    Ok(buffer)
}
