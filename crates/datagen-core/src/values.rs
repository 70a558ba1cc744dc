//! Generated values and rows.
//!
//! A [`Row`] keeps its values in declared field order. Structured values
//! (cities, names, CSV records) are reference counted so that dictionary
//! entries are shared between rows instead of cloned.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Rendering of date-time values: ISO-8601 in UTC, to the second.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A city from the built-in dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub name: String,
    /// Latitude as written in the dictionary
    pub latitude: String,
    /// Longitude as written in the dictionary
    pub longitude: String,
    pub country: String,
    pub population: u64,
}

impl City {
    /// Attributes a link can read from a city.
    pub const ATTRIBUTES: [&'static str; 5] = ["name", "lat", "long", "country", "population"];

    /// Read a named attribute.
    pub fn attribute(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "name" => Some(Cow::Borrowed(&self.name)),
            "lat" => Some(Cow::Borrowed(&self.latitude)),
            "long" => Some(Cow::Borrowed(&self.longitude)),
            "country" => Some(Cow::Borrowed(&self.country)),
            "population" => Some(Cow::Owned(self.population.to_string())),
            _ => None,
        }
    }
}

/// A first name from the built-in dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    pub first_name: String,
    pub country: String,
    pub male: bool,
    pub female: bool,
    pub unisex: bool,
}

impl PersonName {
    /// Attributes a link can read from a name.
    pub const ATTRIBUTES: [&'static str; 6] =
        ["first_name", "country", "sex", "male", "female", "unisex"];

    /// `UNKNOWN` for unisex names, otherwise `MALE` or `FEMALE`.
    pub fn sex(&self) -> &'static str {
        if self.unisex {
            "UNKNOWN"
        } else if self.male {
            "MALE"
        } else {
            "FEMALE"
        }
    }

    /// Read a named attribute.
    pub fn attribute(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "first_name" => Some(Cow::Borrowed(&self.first_name)),
            "country" => Some(Cow::Borrowed(&self.country)),
            "sex" => Some(Cow::Borrowed(self.sex())),
            "male" => Some(Cow::Owned(self.male.to_string())),
            "female" => Some(Cow::Owned(self.female.to_string())),
            "unisex" => Some(Cow::Owned(self.unisex.to_string())),
            _ => None,
        }
    }
}

/// One record of an external CSV file, keyed by header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    /// Column shown when the record is rendered as a single value
    pub display_column: String,
    pub columns: IndexMap<String, String>,
}

impl CsvRecord {
    pub fn new(display_column: impl Into<String>, columns: IndexMap<String, String>) -> Self {
        Self {
            display_column: display_column.into(),
            columns,
        }
    }

    /// Value of a column by header name.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    /// Value of the display column, or an empty string.
    pub fn display_value(&self) -> &str {
        self.get(&self.display_column).unwrap_or_default()
    }
}

/// A single generated or computed value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// No value (a computed field whose output could not be cast)
    Null,
    Integer(i32),
    Long(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Raw bytes, rendered as uppercase hex
    Bytes(Vec<u8>),
    City(Arc<City>),
    Name(Arc<PersonName>),
    Csv(Arc<CsvRecord>),
}

impl FieldValue {
    /// Check if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Render the value the way rules and text sinks see it.
    ///
    /// Structured values render as their display name; null renders empty.
    pub fn to_string_value(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Null => Cow::Borrowed(""),
            FieldValue::Integer(v) => Cow::Owned(v.to_string()),
            FieldValue::Long(v) => Cow::Owned(v.to_string()),
            FieldValue::Float(v) => Cow::Owned(v.to_string()),
            FieldValue::Boolean(v) => Cow::Borrowed(if *v { "true" } else { "false" }),
            FieldValue::Text(v) => Cow::Borrowed(v),
            FieldValue::Date(v) => Cow::Owned(v.format("%Y-%m-%d").to_string()),
            FieldValue::DateTime(v) => Cow::Owned(v.format(DATE_TIME_FORMAT).to_string()),
            FieldValue::Bytes(v) => Cow::Owned(hex::encode_upper(v)),
            FieldValue::City(city) => Cow::Borrowed(&city.name),
            FieldValue::Name(name) => Cow::Borrowed(&name.first_name),
            FieldValue::Csv(record) => Cow::Borrowed(record.display_value()),
        }
    }

    /// Get the value as an i64 if it is an integral number.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(i64::from(*v)),
            FieldValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as an f64 if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(v) => Some(f64::from(*v)),
            FieldValue::Long(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as a string slice if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Get the city if this is a city value.
    pub fn as_city(&self) -> Option<&City> {
        match self {
            FieldValue::City(city) => Some(city),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_value())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Integer(v) => serializer.serialize_i32(*v),
            FieldValue::Long(v) => serializer.serialize_i64(*v),
            FieldValue::Float(v) => serializer.serialize_f64(*v),
            FieldValue::Boolean(v) => serializer.serialize_bool(*v),
            other => serializer.serialize_str(&other.to_string_value()),
        }
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Long(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<City> for FieldValue {
    fn from(v: City) -> Self {
        FieldValue::City(Arc::new(v))
    }
}

impl From<PersonName> for FieldValue {
    fn from(v: PersonName) -> Self {
        FieldValue::Name(Arc::new(v))
    }
}

impl From<CsvRecord> for FieldValue {
    fn from(v: CsvRecord) -> Self {
        FieldValue::Csv(Arc::new(v))
    }
}

/// One generated record: field values in declared order.
///
/// A row is owned by the worker that builds it until it is handed to a sink.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    /// Global generation index of this row
    index: u64,
    values: IndexMap<String, FieldValue>,
}

impl Row {
    /// Create an empty row for the given global index.
    pub fn new(index: u64) -> Self {
        Self {
            index,
            values: IndexMap::new(),
        }
    }

    /// Create an empty row with room for `capacity` fields.
    pub fn with_capacity(index: u64, capacity: usize) -> Self {
        Self {
            index,
            values: IndexMap::with_capacity(capacity),
        }
    }

    /// Create a row builder.
    pub fn builder(index: u64) -> RowBuilder {
        RowBuilder {
            row: Row::new(index),
        }
    }

    /// Global generation index.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Get a value by field name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Get a value rendered as text, or `None` if the field is not set.
    pub fn get_string(&self, name: &str) -> Option<Cow<'_, str>> {
        self.values.get(name).map(FieldValue::to_string_value)
    }

    /// Set a value. A field that is already present keeps its position.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.values.insert(name.into(), value);
    }

    /// Check whether a field has been set.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of fields set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no field has been set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reorder the values by a position function, e.g. declared field position.
    pub fn reorder_by(&mut self, mut position: impl FnMut(&str) -> usize) {
        self.values
            .sort_by(|a, _, b, _| position(a).cmp(&position(b)));
    }

    /// Consume the row and return its values.
    pub fn into_values(self) -> IndexMap<String, FieldValue> {
        self.values
    }
}

/// Builder for constructing rows field by field.
pub struct RowBuilder {
    row: Row,
}

impl RowBuilder {
    /// Add a field value.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.row.set(name, value.into());
        self
    }

    /// Build the row.
    pub fn build(self) -> Row {
        self.row
    }
}
