//! Inspect command implementation.

use super::VocabArgs;
use anyhow::Result;
use clap::Parser;

/// Inspect command arguments.
#[derive(Parser)]
pub struct InspectCommand {
    #[command(flatten)]
    pub vocab: VocabArgs,

    /// Also list every special token with its ID
    #[arg(long, default_value_t = false)]
    pub list_special: bool,
}

pub fn run(cmd: InspectCommand) -> Result<()> {
    let tokenizer = cmd.vocab.tokenizer()?;
    let vocab = tokenizer.vocab();
    let stats = vocab.stats();

    println!("Vocabulary: {}", cmd.vocab.vocab.display());
    println!("  Total IDs:       {}", stats.total);
    println!("  Base bytes:      {} ({} ranked)", stats.base, stats.ranked_base);
    println!("  Merged pieces:   {}", stats.merged);
    println!("  Special tokens:  {}", stats.special);
    match stats.merges.max_rank {
        Some(max) => println!("  Max merge rank:  {}", max),
        None => println!("  Max merge rank:  -"),
    }
    println!("  Longest piece:   {} bytes", stats.merges.longest_piece);

    if cmd.list_special {
        for (name, id) in vocab.special_tokens().iter() {
            println!("  {:>8}  {}", id, name);
        }
    }

    Ok(())
}
