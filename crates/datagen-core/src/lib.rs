//! Core types for datagen.
//!
//! - [`FieldKind`] / [`ValueKind`] - closed sets of field and comparison kinds
//! - [`FieldValue`] - a generated or computed value
//! - [`Row`] - one record, values in declared field order
//! - [`ModelDefinition`] - model loaded from YAML
//! - [`FieldTypes`] - "kind of field by name", consumed by the rule binder
//!
//! # Architecture
//!
//! ```text
//! datagen-core (this crate)
//!    │
//!    ├─── datagen-rules      (parses and binds rule text against FieldTypes)
//!    ├─── datagen-generator  (fills rows, runs the batch scheduler)
//!    └─── datagen-sink       (writes rows as CSV / JSONL)
//! ```
//!
//! # Example
//!
//! ```rust
//! use datagen_core::{FieldValue, Row};
//!
//! let row = Row::builder(0).field("name", "Ann").field("age", 31).build();
//! assert_eq!(row.get_string("age").as_deref(), Some("31"));
//! assert_eq!(row.get("name"), Some(&FieldValue::from("Ann")));
//! ```

pub mod schema;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use schema::{FieldDefinition, ModelDefinition, NumericBound, RuleLines, SchemaError};
pub use types::{FieldKind, FieldTypes, ValueKind};
pub use values::{City, CsvRecord, FieldValue, PersonName, Row, RowBuilder, DATE_TIME_FORMAT};
