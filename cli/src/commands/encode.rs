//! Encode command implementation.

use super::{read_input, VocabArgs};
use anyhow::Result;
use clap::Parser;
use mergerank_tokenizer::AllowedSpecial;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    #[command(flatten)]
    pub vocab: VocabArgs,

    /// Text to encode (`-` reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Emit IDs for special tokens written literally in the text
    #[arg(long, default_value_t = false)]
    pub allow_special: bool,

    /// Also print the piece each ID decodes to
    #[arg(long, default_value_t = false)]
    pub pieces: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<String>,
}

pub fn run(cmd: EncodeCommand) -> Result<()> {
    let tokenizer = cmd.vocab.tokenizer()?;
    let text = read_input(&cmd.input)?;

    let ids = if cmd.allow_special {
        tokenizer.encode_with_special_tokens(&text, AllowedSpecial::All)?
    } else {
        tokenizer.encode(&text)?
    };

    let ids_str: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    let output = ids_str.join(" ");

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            println!("Encoded {} tokens to {}", ids.len(), path);
        }
        None => println!("{}", output),
    }

    if cmd.pieces {
        let pieces: Vec<String> = ids
            .iter()
            .map(|&id| {
                let bytes = tokenizer.id_to_piece(id).unwrap_or_default();
                format!("{:?}", String::from_utf8_lossy(bytes))
            })
            .collect();
        println!("{}", pieces.join(", "));
    }

    Ok(())
}
