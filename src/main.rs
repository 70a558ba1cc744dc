//! Command-line interface for datagen
//!
//! # Usage Examples
//!
//! ```bash
//! # Generate 1000 rows as CSV on standard output
//! datagen generate --model model.yaml --rows 1000
//!
//! # Generate 5 batches of 20k rows as JSON Lines, stopping after 5 minutes
//! datagen generate --model model.yaml --rows 20000 --batches 5 \
//!   --threads 4 --seed 42 --format jsonl --output rows.jsonl --timeout 5m
//!
//! # Check a model by printing a generated row
//! datagen test-model --model model.yaml
//! ```
//!
//! Log verbosity is controlled by `RUST_LOG`, e.g. `RUST_LOG=datagen=debug`.

use clap::{Parser, Subcommand};
use datagen::{run_generate, run_test_model, GenerateArgs, TestModelArgs};
use tracing::info;

#[derive(Parser)]
#[command(name = "datagen")]
#[command(about = "Generate synthetic rows from a YAML model")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate rows and write them as CSV or JSON Lines
    Generate(GenerateArgs),

    /// Print generated rows as JSON, ghost fields included
    TestModel(TestModelArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            let summary = run_generate(args).await?;
            info!(
                "Done: {} row(s) in {} batch(es), {} bytes in {:?} ({:.2} rows/sec)",
                summary.metrics.rows_written,
                summary.batches_written,
                summary.metrics.bytes_written,
                summary.metrics.total_duration,
                summary.metrics.rows_per_second()
            );
            if summary.cancelled {
                info!("Output is partial: generation was cancelled");
            }
        }
        Commands::TestModel(args) => {
            for row in run_test_model(&args)? {
                println!("{}", serde_json::to_string_pretty(&row)?);
            }
        }
    }

    Ok(())
}
