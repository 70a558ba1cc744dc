//! Command-line configuration.

mod duration;

pub use duration::parse_duration;

use clap::Args;
use datagen_sink::SinkFormat;
use std::path::PathBuf;

/// Number of worker threads used when `--threads` is not given.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Arguments of the `generate` command.
#[derive(Args, Clone, Debug)]
pub struct GenerateArgs {
    /// Path to model YAML file
    #[arg(long, short = 'm', env = "DATAGEN_MODEL")]
    pub model: PathBuf,

    /// Number of rows per batch
    #[arg(long, default_value = "1000")]
    pub rows: u64,

    /// Number of batches to generate
    #[arg(long, default_value = "1")]
    pub batches: u64,

    /// Worker threads per batch (0 is treated as 1)
    #[arg(long, default_value_t = default_threads(), env = "DATAGEN_THREADS")]
    pub threads: usize,

    /// Random seed for deterministic generation (overrides the model's seed)
    #[arg(long, env = "DATAGEN_SEED")]
    pub seed: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = SinkFormat::Csv)]
    pub format: SinkFormat,

    /// Output file (standard output if omitted)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Stop generating after this long, e.g. "30s", "5m", "1h"
    #[arg(long)]
    pub timeout: Option<String>,

    /// Dry-run mode: load and bind the model without generating rows
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments of the `test-model` command.
#[derive(Args, Clone, Debug)]
pub struct TestModelArgs {
    /// Path to model YAML file
    #[arg(long, short = 'm', env = "DATAGEN_MODEL")]
    pub model: PathBuf,

    /// Number of rows to print
    #[arg(long, default_value = "1")]
    pub rows: u64,

    /// Random seed (overrides the model's seed)
    #[arg(long, env = "DATAGEN_SEED")]
    pub seed: Option<u64>,
}
