//! datagen library
//!
//! Generates synthetic rows from a YAML model. Random fields draw from
//! generators and dictionaries; computed fields are derived by a small rule
//! language (conditions, formulas, links and injections).
//!
//! # Crates
//!
//! - `datagen_core` - model, row and value types
//! - `datagen_rules` - rule parsing, binding and evaluation
//! - `datagen_generator` - row building and the concurrent batch scheduler
//! - `datagen_sink` - CSV and JSON Lines output
//!
//! # CLI Usage
//!
//! ```bash
//! # 10 batches of 100k rows on 8 threads, as CSV
//! datagen generate --model customers.yaml --rows 100000 --batches 10 \
//!   --threads 8 --seed 42 --output customers.csv
//!
//! # Print one row, ghost fields included
//! datagen test-model --model customers.yaml
//! ```

pub mod config;
pub mod generate;
pub mod test_model;

pub use config::{GenerateArgs, TestModelArgs};
pub use generate::{generate, run_generate, GenerateSummary};
pub use test_model::run_test_model;
