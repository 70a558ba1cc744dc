//! Rule language for computed fields.
//!
//! A computed field is described by ordered lines, each pairing a condition
//! text with an output text:
//!
//! ```yaml
//! conditionals:
//!   "$age<30 & $country=France": young-fr
//!   "$age<30": young
//!   formula: "$age * 2"        # special lines consume the whole line
//!   default: other
//! ```
//!
//! # Architecture
//!
//! ```text
//!   (condition, output) pairs
//!            │  parser::parse_line
//!            ▼
//!     UnboundRuleSet            names only
//!            │  bind(&impl FieldTypes)
//!            ▼
//!         RuleSet               immutable, Send + Sync
//!            │  evaluate(&Row)
//!            ▼
//!         String                first satisfied line's output, or ""
//! ```
//!
//! Rule errors never abort generation. Parse and bind problems turn the line
//! unsatisfiable and are kept as [`RuleError`] diagnostics; evaluation
//! problems are logged and read as `false`, `""` or `"0"`.
//!
//! # Example
//!
//! ```rust
//! use datagen_core::{FieldKind, Row};
//! use datagen_rules::RuleSet;
//! use indexmap::IndexMap;
//!
//! let mut types = IndexMap::new();
//! types.insert("age".to_string(), FieldKind::Integer);
//!
//! let rules = RuleSet::build(
//!     "segment",
//!     [("$age<30", "young"), ("default", "adult")],
//!     &types,
//! );
//! let row = Row::builder(0).field("age", 25).build();
//! assert_eq!(rules.evaluate(&row), "young");
//! ```

pub mod condition;
pub mod error;
pub mod expr;
pub mod formula;
pub mod injection;
pub mod line;
pub mod link;
pub mod operators;
pub mod parser;
pub mod ruleset;

// Re-exports for convenience
pub use condition::{BoundOperand, Condition, Number};
pub use error::{BindError, EvalError, ParseError, RuleError};
pub use formula::{FormulaTemplate, FORMULA_FALLBACK};
pub use injection::{Fragment, Injection};
pub use line::{Line, LineKind};
pub use link::{Link, LinkPath};
pub use operators::{CompareOp, LogicalOp};
pub use parser::{Atom, Operand, UnboundLine};
pub use ruleset::{RuleSet, UnboundEntry, UnboundRuleSet};
