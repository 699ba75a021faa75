//! Decode command implementation.

use super::VocabArgs;
use anyhow::{Context, Result};
use clap::Parser;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    #[command(flatten)]
    pub vocab: VocabArgs,

    /// Token IDs to decode (comma-separated)
    #[arg(short, long)]
    pub tokens: String,

    /// Replace invalid UTF-8 instead of failing
    #[arg(long, default_value_t = false)]
    pub lossy: bool,
}

pub fn run(cmd: DecodeCommand) -> Result<()> {
    let tokenizer = cmd.vocab.tokenizer()?;

    let ids: Vec<u32> = cmd
        .tokens
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .parse::<u32>()
                .with_context(|| format!("invalid token ID {:?}", s.trim()))
        })
        .collect::<Result<_>>()?;

    let text = if cmd.lossy {
        tokenizer.decode_lossy(&ids)?
    } else {
        tokenizer.decode(&ids)?
    };

    println!("{}", text);

    Ok(())
}
