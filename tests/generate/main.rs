//! End-to-end tests of the `generate` and `test-model` commands.
//!
//! Models are loaded from `tests/fixtures/`, generated with a fixed seed and
//! written to a temporary directory, then read back and checked against the
//! rules each model declares.

mod csv_output;
mod jsonl_output;
mod test_model;

use datagen::GenerateArgs;
use datagen_sink::SinkFormat;
use std::path::{Path, PathBuf};

pub const SEED: u64 = 42;
pub const ROW_COUNT: u64 = 50; // Small scale for integration tests
pub const CUSTOMERS: &str = "tests/fixtures/customers.yaml";
pub const CATALOG: &str = "tests/fixtures/catalog.yaml";

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("datagen=info,datagen_generator=info")
        .try_init()
        .ok();
}

/// Arguments for a seeded run of `model` writing to `output`.
pub fn generate_args(model: &str, format: SinkFormat, output: &Path) -> GenerateArgs {
    GenerateArgs {
        model: PathBuf::from(model),
        rows: ROW_COUNT,
        batches: 1,
        threads: 4,
        seed: Some(SEED),
        format,
        output: Some(output.to_path_buf()),
        timeout: None,
        dry_run: false,
    }
}
