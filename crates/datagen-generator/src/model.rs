//! Bound models: every generator built and every rule set bound.

use crate::cast::ValueCaster;
use crate::error::GeneratorError;
use crate::generators::FieldGenerator;
use datagen_core::{FieldDefinition, FieldValue, ModelDefinition, Row};
use datagen_rules::{RuleError, RuleSet, UnboundRuleSet};
use rand::Rng;
use std::path::Path;
use tracing::{debug, info, warn};

/// A field drawn at random.
#[derive(Debug, Clone)]
pub struct RandomField {
    pub name: String,
    pub generator: FieldGenerator,
}

/// A field computed from other fields by its rule set.
#[derive(Debug, Clone)]
pub struct ComputedField {
    pub name: String,
    pub rules: RuleSet,
    pub caster: ValueCaster,
}

/// An immutable model ready for generation.
///
/// Binding consumes the [`ModelDefinition`]: all rule sets are parsed first
/// and only then bound against the complete field list, so a rule may
/// reference any field regardless of declaration order. A `BoundModel` is
/// `Send + Sync` and is shared by all workers.
#[derive(Debug, Clone)]
pub struct BoundModel {
    definition: ModelDefinition,
    random_fields: Vec<RandomField>,
    computed_fields: Vec<ComputedField>,
    /// A random field is declared after a computed one
    needs_reorder: bool,
}

impl BoundModel {
    /// Build generators and bind rule sets.
    pub fn bind(definition: ModelDefinition) -> Result<Self, GeneratorError> {
        let mut random_fields = Vec::new();
        let mut unbound: Vec<(UnboundRuleSet, ValueCaster)> = Vec::new();
        let mut needs_reorder = false;

        // Parse everything before binding anything
        for field in &definition.fields {
            match field.rule_lines() {
                Some(lines) => {
                    let rules = UnboundRuleSet::parse(field.name.as_str(), lines);
                    unbound.push((rules, ValueCaster::for_field(field)?));
                }
                None => {
                    needs_reorder |= !unbound.is_empty();
                    random_fields.push(random_field(field)?);
                }
            }
        }

        let computed_fields: Vec<ComputedField> = unbound
            .into_iter()
            .map(|(rules, caster)| {
                let rules = rules.bind(&definition);
                ComputedField {
                    name: rules.field().to_string(),
                    rules,
                    caster,
                }
            })
            .collect();

        let model = Self {
            definition,
            random_fields,
            computed_fields,
            needs_reorder,
        };

        let diagnostics = model.diagnostics().count();
        if diagnostics > 0 {
            warn!(
                "Model '{}' has {diagnostics} rule problem(s); affected lines never match",
                model.name()
            );
        }
        info!(
            "Bound model '{}': {} random field(s), {} computed field(s)",
            model.name(),
            model.random_fields.len(),
            model.computed_fields.len()
        );
        Ok(model)
    }

    /// Load and bind a model from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GeneratorError> {
        Self::bind(ModelDefinition::from_file(path)?)
    }

    /// Parse and bind a model from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, GeneratorError> {
        Self::bind(ModelDefinition::from_yaml(yaml)?)
    }

    pub fn definition(&self) -> &ModelDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn seed(&self) -> Option<u64> {
        self.definition.seed
    }

    pub fn random_fields(&self) -> &[RandomField] {
        &self.random_fields
    }

    /// Computed fields in declared order.
    pub fn computed_fields(&self) -> &[ComputedField] {
        &self.computed_fields
    }

    /// Names of fields that appear in output (ghost fields excluded).
    pub fn output_field_names(&self) -> Vec<&str> {
        self.definition.output_field_names()
    }

    /// Parse and bind problems of every rule set.
    pub fn diagnostics(&self) -> impl Iterator<Item = &RuleError> {
        self.computed_fields
            .iter()
            .flat_map(|f| f.rules.diagnostics())
    }

    /// Build one row: random fields first, then computed fields in declared
    /// order, each seeing the row built so far.
    ///
    /// The returned row lists its values in declared field order.
    pub fn build_row<R: Rng>(&self, rng: &mut R, index: u64) -> Row {
        let mut row = Row::with_capacity(index, self.definition.fields.len());

        for field in &self.random_fields {
            row.set(field.name.as_str(), field.generator.generate(rng, index));
        }

        for field in &self.computed_fields {
            let output = field.rules.evaluate(&row);
            let value = field.caster.cast(&output).unwrap_or_else(|| {
                if output.is_empty() {
                    debug!(row = index, "Field '{}' computed no value", field.name);
                } else {
                    warn!(
                        row = index,
                        "Field '{}': cannot cast '{output}', using null", field.name
                    );
                }
                FieldValue::Null
            });
            row.set(field.name.as_str(), value);
        }

        if self.needs_reorder {
            let definition = &self.definition;
            row.reorder_by(|name| definition.field_position(name).unwrap_or(usize::MAX));
        }
        row
    }
}

fn random_field(definition: &FieldDefinition) -> Result<RandomField, GeneratorError> {
    Ok(RandomField {
        name: definition.name.clone(),
        generator: FieldGenerator::from_definition(definition)?,
    })
}
