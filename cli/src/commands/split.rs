//! Split command implementation.

use super::{read_input, VocabArgs};
use anyhow::Result;
use clap::Parser;

/// Split command arguments.
#[derive(Parser)]
pub struct SplitCommand {
    #[command(flatten)]
    pub vocab: VocabArgs,

    /// Text to split (`-` reads stdin)
    #[arg(short, long)]
    pub input: String,
}

pub fn run(cmd: SplitCommand) -> Result<()> {
    let tokenizer = cmd.vocab.tokenizer()?;
    let text = read_input(&cmd.input)?;

    for chunk in tokenizer.split(&text) {
        let ids = tokenizer.encode_chunk(chunk.text)?;
        println!(
            "{:>6}  {:<18} {:?} -> {:?}",
            chunk.start,
            format!("{:?}", chunk.rule),
            chunk.text,
            ids
        );
    }

    Ok(())
}
