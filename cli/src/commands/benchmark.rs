//! Benchmark command implementation.

use super::VocabArgs;
use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::time::Instant;

/// Benchmark command arguments.
#[derive(Parser)]
pub struct BenchmarkCommand {
    #[command(flatten)]
    pub vocab: VocabArgs,

    /// Path to input text file for benchmarking
    #[arg(short, long)]
    pub input: String,

    /// Number of iterations to run
    #[arg(long, default_value_t = 100)]
    pub iterations: usize,

    /// Merge chunks on the thread pool
    #[arg(long, default_value_t = false)]
    pub parallel: bool,
}

pub fn run(cmd: BenchmarkCommand) -> Result<()> {
    let tokenizer = cmd.vocab.tokenizer()?;
    let text = fs::read_to_string(&cmd.input)
        .with_context(|| format!("failed to read {}", cmd.input))?;
    let iterations = cmd.iterations.max(1);

    let encode = |text: &str| {
        if cmd.parallel {
            tokenizer.encode_parallel(text)
        } else {
            tokenizer.encode(text)
        }
    };

    println!("Benchmarking encoding...");
    println!("  Text length: {} bytes", text.len());
    println!("  Iterations: {}", iterations);
    println!();

    // Warmup
    let tokens = encode(&text)?.len();

    let start = Instant::now();
    for _ in 0..iterations {
        encode(&text)?;
    }
    let elapsed = start.elapsed();

    let avg_secs = elapsed.as_secs_f64() / iterations as f64;
    let cache = tokenizer.cache_stats();

    println!("Results:");
    println!("  Tokens per pass: {}", tokens);
    println!("  Total time: {:.2}s", elapsed.as_secs_f64());
    println!("  Average time: {:.3}ms", avg_secs * 1000.0);
    println!("  Throughput: {:.0} tokens/s", tokens as f64 / avg_secs);
    println!(
        "  Throughput: {:.2} MB/s",
        text.len() as f64 / avg_secs / 1_000_000.0
    );
    if let Some(rate) = cache.hit_rate {
        println!("  Cache hit rate: {:.1}%", rate * 100.0);
    }

    Ok(())
}
