//! Save command implementation.

use super::VocabArgs;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Save command arguments.
#[derive(Parser)]
pub struct SaveCommand {
    #[command(flatten)]
    pub vocab: VocabArgs,

    /// Output directory
    #[arg(short, long)]
    pub output: PathBuf,
}

pub fn run(cmd: SaveCommand) -> Result<()> {
    let tokenizer = cmd.vocab.tokenizer()?;

    tokenizer
        .save(&cmd.output)
        .with_context(|| format!("failed to save vocabulary to {}", cmd.output.display()))?;

    println!(
        "Saved {} IDs to {}",
        tokenizer.vocab_size(),
        cmd.output.display()
    );

    Ok(())
}
