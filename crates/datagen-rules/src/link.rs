//! Link lines: read an attribute of another field's structured value.

use crate::error::{BindError, EvalError, ParseError};
use datagen_core::{City, FieldKind, FieldTypes, FieldValue, PersonName, Row};
use tracing::warn;

/// A parsed `target.attribute` path, before the target's kind is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPath {
    pub target: String,
    pub attribute: String,
}

impl LinkPath {
    /// Parse `$target.attribute`. Sigils are ignored; the attribute is
    /// everything after the first dot.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let cleaned: String = text.chars().filter(|c| *c != '$').collect();
        let malformed = || ParseError::MalformedLink(text.to_string());
        let (target, attribute) = cleaned.trim().split_once('.').ok_or_else(malformed)?;
        if target.is_empty() || attribute.is_empty() {
            return Err(malformed());
        }
        Ok(Self {
            target: target.to_string(),
            attribute: attribute.to_string(),
        })
    }

    /// Resolve the target's kind.
    ///
    /// The link is always returned. When binding fails it carries no kind
    /// and evaluates to an empty string; the error is returned alongside.
    pub fn bind(self, types: &impl FieldTypes) -> (Link, Option<BindError>) {
        let kind = types.field_kind(&self.target);
        let error = match kind {
            None => Some(BindError::UnknownColumn(self.target.clone())),
            Some(kind) if !kind.is_structured() => Some(BindError::NotLinkable(self.target.clone())),
            Some(kind) if !attribute_exists(kind, &self.attribute) => {
                Some(BindError::UnknownAttribute {
                    target: self.target.clone(),
                    kind,
                    attribute: self.attribute.clone(),
                })
            }
            Some(_) => None,
        };
        let target_kind = kind.filter(|k| k.is_structured());
        (
            Link {
                target: self.target,
                attribute: self.attribute,
                target_kind,
            },
            error,
        )
    }
}

/// CSV headers are only known per file, so any attribute may exist.
fn attribute_exists(kind: FieldKind, attribute: &str) -> bool {
    match kind {
        FieldKind::City => City::ATTRIBUTES.contains(&attribute),
        FieldKind::Name => PersonName::ATTRIBUTES.contains(&attribute),
        _ => true,
    }
}

/// A bound link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    target: String,
    attribute: String,
    /// `None` when the target is unknown or not structured
    target_kind: Option<FieldKind>,
}

impl Link {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn target_kind(&self) -> Option<FieldKind> {
        self.target_kind
    }

    fn try_evaluate(&self, row: &Row) -> Result<Option<String>, EvalError> {
        let Some(kind) = self.target_kind else {
            return Ok(None);
        };
        let value = row
            .get(&self.target)
            .ok_or_else(|| EvalError::MissingColumn(self.target.clone()))?;
        let attribute = match (kind, value) {
            (FieldKind::City, FieldValue::City(city)) => city.attribute(&self.attribute),
            (FieldKind::Name, FieldValue::Name(name)) => name.attribute(&self.attribute),
            (FieldKind::Csv, FieldValue::Csv(record)) => {
                record.get(&self.attribute).map(Into::into)
            }
            _ => return Err(EvalError::NotStructured(self.target.clone())),
        };
        Ok(attribute.map(|a| a.into_owned()))
    }

    /// Read the attribute from the row; any failure yields `""`.
    pub fn evaluate(&self, row: &Row) -> String {
        match self.try_evaluate(row) {
            Ok(Some(value)) => value,
            Ok(None) => {
                warn!(
                    row = row.index(),
                    "Cannot find attribute '{}' of '{}', returning empty value",
                    self.attribute,
                    self.target
                );
                String::new()
            }
            Err(e) => {
                warn!(row = row.index(), "Cannot evaluate link, returning empty value: {e}");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn types() -> IndexMap<String, FieldKind> {
        let mut types = IndexMap::new();
        types.insert("city".to_string(), FieldKind::City);
        types.insert("first".to_string(), FieldKind::Name);
        types.insert("product".to_string(), FieldKind::Csv);
        types.insert("age".to_string(), FieldKind::Integer);
        types
    }

    fn row() -> Row {
        let mut columns = IndexMap::new();
        columns.insert("sku".to_string(), "A-1".to_string());
        Row::builder(3)
            .field(
                "city",
                City {
                    name: "Lyon".to_string(),
                    latitude: "45.75".to_string(),
                    longitude: "4.85".to_string(),
                    country: "France".to_string(),
                    population: 513_000,
                },
            )
            .field(
                "first",
                PersonName {
                    first_name: "Ann".to_string(),
                    country: "USA".to_string(),
                    male: false,
                    female: true,
                    unisex: false,
                },
            )
            .field(
                "product",
                datagen_core::CsvRecord::new("sku", columns),
            )
            .field("age", 30)
            .build()
    }

    fn link(text: &str) -> (Link, Option<BindError>) {
        LinkPath::parse(text).unwrap().bind(&types())
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            LinkPath::parse("$city.lat").unwrap(),
            LinkPath {
                target: "city".to_string(),
                attribute: "lat".to_string()
            }
        );
        assert!(LinkPath::parse("city").is_err());
        assert!(LinkPath::parse("$city.").is_err());
        assert!(LinkPath::parse(".lat").is_err());
    }

    #[test]
    fn test_city_latitude() {
        let (link, error) = link("$city.lat");
        assert!(error.is_none());
        assert_eq!(link.target_kind(), Some(FieldKind::City));
        assert_eq!(link.evaluate(&row()), "45.75");
    }

    #[test]
    fn test_unknown_attribute_is_empty() {
        let (link, error) = link("$city.altitude");
        assert!(matches!(error, Some(BindError::UnknownAttribute { .. })));
        assert_eq!(link.evaluate(&row()), "");
    }

    #[test]
    fn test_name_and_csv_attributes() {
        assert_eq!(link("$first.sex").0.evaluate(&row()), "FEMALE");
        assert_eq!(link("$product.sku").0.evaluate(&row()), "A-1");
        assert_eq!(link("$product.price").0.evaluate(&row()), "");
    }

    #[test]
    fn test_unbindable_targets() {
        let (unknown, error) = link("$nope.lat");
        assert_eq!(error, Some(BindError::UnknownColumn("nope".to_string())));
        assert_eq!(unknown.evaluate(&row()), "");

        let (scalar, error) = link("$age.lat");
        assert_eq!(error, Some(BindError::NotLinkable("age".to_string())));
        assert_eq!(scalar.target_kind(), None);
        assert_eq!(scalar.evaluate(&row()), "");
    }

    #[test]
    fn test_value_of_wrong_shape_is_empty() {
        let (link, _) = link("$city.lat");
        let row = Row::builder(0).field("city", "Paris").build();
        assert_eq!(link.evaluate(&row), "");
    }
}
