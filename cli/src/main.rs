//! Mergerank CLI - Command-line interface for the BPE tokenizer.
//!
//! This is the main entry point for the `mergerank` command-line tool.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use commands::{
    BenchmarkCommand, DecodeCommand, EncodeCommand, InspectCommand, SaveCommand, SplitCommand,
};
use tracing::Level;

#[derive(Parser)]
#[command(name = "mergerank")]
#[command(about = "A rank-driven byte-level BPE tokenizer", long_about = None)]
#[command(version)]
struct Cli {
    /// Log more to stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode text to token IDs
    Encode(EncodeCommand),
    /// Decode token IDs back to text
    Decode(DecodeCommand),
    /// Show how text is cut into chunks before merging
    Split(SplitCommand),
    /// Print vocabulary statistics
    Inspect(InspectCommand),
    /// Benchmark encoding performance
    Benchmark(BenchmarkCommand),
    /// Save the vocabulary as a tiktoken directory
    Save(SaveCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Decode(cmd) => commands::decode::run(cmd)?,
        Commands::Split(cmd) => commands::split::run(cmd)?,
        Commands::Inspect(cmd) => commands::inspect::run(cmd)?,
        Commands::Benchmark(cmd) => commands::benchmark::run(cmd)?,
        Commands::Save(cmd) => commands::save::run(cmd)?,
    }

    Ok(())
}
