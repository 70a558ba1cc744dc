//! Uniform and weighted choice among a fixed set of values.

use crate::error::GeneratorError;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

/// A non-empty set of values to draw from.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    items: Vec<T>,
    weights: Option<WeightedIndex<u64>>,
}

impl<T> Pool<T> {
    /// Every item equally likely.
    pub fn uniform(field: &str, items: Vec<T>) -> Result<Self, GeneratorError> {
        if items.is_empty() {
            return Err(GeneratorError::EmptyPool {
                field: field.to_string(),
            });
        }
        Ok(Self {
            items,
            weights: None,
        })
    }

    /// Items drawn proportionally to their weight.
    pub fn weighted(field: &str, items: Vec<(T, u64)>) -> Result<Self, GeneratorError> {
        if items.is_empty() {
            return Err(GeneratorError::EmptyPool {
                field: field.to_string(),
            });
        }
        let (items, weights): (Vec<T>, Vec<u64>) = items.into_iter().unzip();
        let weights = WeightedIndex::new(weights).map_err(|e| GeneratorError::InvalidWeights {
            field: field.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            items,
            weights: Some(weights),
        })
    }

    /// Draw one item.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> &T {
        let idx = match &self.weights {
            Some(weights) => weights.sample(rng),
            None => rng.random_range(0..self.items.len()),
        };
        &self.items[idx]
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_weighted(&self) -> bool {
        self.weights.is_some()
    }
}
