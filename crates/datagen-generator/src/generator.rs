//! Main data generator for producing rows of a bound model.

use crate::model::BoundModel;
use datagen_core::Row;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::iter::FusedIterator;
use std::sync::Arc;
use tracing::info;

/// Compute the RNG seed for a specific global row index.
///
/// This allows jumping to any index while maintaining determinism.
pub fn seed_for_index(base_seed: u64, index: u64) -> u64 {
    base_seed.wrapping_add(index.wrapping_mul(0x9E3779B97F4A7C15))
}

/// Pick the base seed: explicit seed first, then the model's, then random.
///
/// A random seed is logged so that the run can be reproduced.
pub fn resolve_seed(explicit: Option<u64>, model: &BoundModel) -> u64 {
    if let Some(seed) = explicit.or(model.seed()) {
        return seed;
    }
    let seed = rand::rng().random();
    info!("No seed configured, using random seed {seed}");
    seed
}

/// Data generator that produces deterministic rows.
///
/// The generator uses a seeded random number generator to ensure
/// reproducible results across runs with the same seed and model.
pub struct DataGenerator {
    /// Model defining the fields and their rules
    model: Arc<BoundModel>,
    /// Base seed the RNG was derived from
    seed: u64,
    /// Seeded random number generator for reproducibility
    rng: StdRng,
    /// Current global row index
    index: u64,
}

impl DataGenerator {
    /// Create a new data generator with the given model and seed.
    pub fn new(model: Arc<BoundModel>, seed: u64) -> Self {
        Self {
            model,
            seed,
            rng: StdRng::seed_from_u64(seed),
            index: 0,
        }
    }

    /// Set the starting index for row generation.
    ///
    /// Note: This also re-seeds the RNG from the base seed and the index.
    pub fn with_start_index(mut self, index: u64) -> Self {
        self.index = index;
        self.rng = StdRng::seed_from_u64(seed_for_index(self.seed, index));
        self
    }

    /// Get the current row index.
    pub fn current_index(&self) -> u64 {
        self.index
    }

    /// Generate the next row.
    pub fn next_row(&mut self) -> Row {
        let row = self.model.build_row(&mut self.rng, self.index);
        self.index += 1;
        row
    }

    /// Generate multiple rows.
    ///
    /// Returns an iterator that lazily generates rows.
    pub fn rows(&mut self, count: u64) -> RowIterator<'_> {
        RowIterator {
            generator: self,
            remaining: count,
        }
    }

    /// Get a reference to the model.
    pub fn model(&self) -> &BoundModel {
        &self.model
    }
}

/// Iterator that lazily generates rows.
pub struct RowIterator<'a> {
    generator: &'a mut DataGenerator,
    remaining: u64,
}

impl Iterator for RowIterator<'_> {
    type Item = Row;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.generator.next_row())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for RowIterator<'_> {}
