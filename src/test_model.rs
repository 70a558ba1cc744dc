//! `test-model` command handler.

use crate::config::TestModelArgs;
use anyhow::Context;
use datagen_generator::{resolve_seed, BoundModel, DataGenerator};
use std::sync::Arc;
use tracing::warn;

/// Generate a few rows, ghost fields included, as JSON objects.
///
/// Rule problems found while binding are logged as warnings.
pub fn run_test_model(args: &TestModelArgs) -> anyhow::Result<Vec<serde_json::Value>> {
    let model = BoundModel::from_file(&args.model)
        .with_context(|| format!("Failed to load model from {:?}", args.model))?;
    for diagnostic in model.diagnostics() {
        warn!("{diagnostic}");
    }

    let seed = resolve_seed(args.seed, &model);
    let mut generator = DataGenerator::new(Arc::new(model), seed);
    generator
        .rows(args.rows)
        .map(|row| serde_json::to_value(row.into_values()).context("Failed to encode row"))
        .collect()
}
