//! Row generation for datagen models.
//!
//! This crate binds a [`ModelDefinition`](datagen_core::ModelDefinition)
//! into a [`BoundModel`] and produces rows from it, either one at a time with
//! [`DataGenerator`] or in parallel batches with [`BatchScheduler`].
//!
//! # Architecture
//!
//! ```text
//! ModelDefinition (YAML)
//!        │  BoundModel::bind
//!        ▼
//! ┌──────────────────────────┐
//! │        BoundModel        │
//! │                          │
//! │  random:   FieldGenerator│
//! │  computed: RuleSet       │
//! │            ValueCaster   │
//! └────────────┬─────────────┘
//!              │ Arc, shared read-only
//!      ┌───────┴────────┐
//!      ▼                ▼
//! DataGenerator    BatchScheduler ── worker threads, one DataGenerator each
//!      │                │
//!      ▼                ▼
//!     Row           BatchResult { rows, cancelled }
//! ```
//!
//! # Example
//!
//! ```rust
//! use datagen_generator::{BatchScheduler, BoundModel};
//! use std::sync::Arc;
//!
//! let model = BoundModel::from_yaml(r#"
//! fields:
//!   - name: age
//!     type: integer
//!     min: 18
//!     max: 90
//!   - name: segment
//!     type: string
//!     conditionals:
//!       "$age<30": young
//!       default: adult
//! "#).unwrap();
//!
//! let result = BatchScheduler::new(Arc::new(model), 42).generate(100, 4).unwrap();
//! assert_eq!(result.rows.len(), 100);
//! ```
//!
//! # Field types
//!
//! - `string`, `string_az` - random alphanumerics / uppercase letters of `length`
//! - `integer`, `long`, `float` - uniform in `[min, max]`
//! - `increment_integer`, `increment_long` - `min` plus the global row index
//! - `boolean`, `uuid`, `ip`
//! - `timestamp` - current time in epoch milliseconds
//! - `birthdate` - date between `min_date` and `max_date`
//! - `email`, `phone`, `country`, `city`, `name` - built-in dictionaries
//! - `csv` - records of an external CSV file

pub mod cast;
pub mod dictionary;
pub mod error;
pub mod generator;
pub mod generators;
pub mod model;
pub mod scheduler;

// Re-exports for convenience
pub use cast::ValueCaster;
pub use error::GeneratorError;
pub use generator::{resolve_seed, seed_for_index, DataGenerator, RowIterator};
pub use generators::FieldGenerator;
pub use model::{BoundModel, ComputedField, RandomField};
pub use scheduler::{partition, BatchResult, BatchScheduler, CancellationFlag};
