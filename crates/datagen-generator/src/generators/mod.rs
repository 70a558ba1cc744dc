//! Individual value generators for different field kinds.
//!
//! [`FieldGenerator`] is built once per random field when a model is bound;
//! it owns every dictionary or lookup table the field needs, so generating
//! a value only touches the RNG.

pub mod choice;
pub mod contact;
pub mod csv_lookup;
pub mod numeric;
pub mod template;
pub mod temporal;
pub mod text;

use crate::cast::parse_scalar;
use crate::dictionary;
use crate::error::GeneratorError;
use chrono::{NaiveDate, NaiveDateTime};
use choice::Pool;
use datagen_core::{
    City, CsvRecord, FieldDefinition, FieldKind, FieldValue, PersonName, SchemaError,
};
use rand::Rng;
use std::sync::Arc;
use template::CharTemplate;
use tracing::warn;

/// Bound generator of one random field.
#[derive(Debug, Clone)]
pub enum FieldGenerator {
    Alphanumeric { length: usize },
    Uppercase { length: usize },
    Integer { min: i32, max: i32 },
    IncrementInteger { start: i32 },
    Long { min: i64, max: i64 },
    IncrementLong { start: i64 },
    Float { min: f64, max: f64 },
    Boolean,
    Timestamp,
    Birthdate { min: NaiveDate, max: NaiveDate },
    DateTime(DateTimeRange),
    DateText { range: DateTimeRange, pattern: String },
    Bytes { length: usize },
    HashMd5 { length: usize },
    Template(CharTemplate),
    Uuid,
    Ip,
    Email { names: Pool<Arc<PersonName>> },
    Phone { indicators: Pool<String> },
    Country(Pool<String>),
    City(Pool<Arc<City>>),
    Name(Pool<Arc<PersonName>>),
    Csv(Pool<Arc<CsvRecord>>),
    /// `possible_values` / `possible_values_weighted`
    OneOf(Pool<FieldValue>),
}

/// Source of `date` and `date_as_string` values.
#[derive(Debug, Clone, Copy)]
pub enum DateTimeRange {
    Now,
    Between { min: NaiveDateTime, max: NaiveDateTime },
}

impl DateTimeRange {
    fn from_definition(definition: &FieldDefinition) -> Self {
        if definition.use_now {
            return DateTimeRange::Now;
        }
        DateTimeRange::Between {
            min: definition
                .min_date_time
                .unwrap_or_else(|| temporal::from_epoch_secs(0)),
            max: definition
                .max_date_time
                .unwrap_or_else(|| temporal::from_epoch_secs(temporal::DEFAULT_MAX_DATE_TIME_SECS)),
        }
    }

    fn generate<R: Rng>(&self, rng: &mut R) -> NaiveDateTime {
        match self {
            DateTimeRange::Now => temporal::now(),
            DateTimeRange::Between { min, max } => {
                temporal::generate_date_time_range(rng, *min, *max)
            }
        }
    }
}

impl FieldGenerator {
    /// Build the generator for a random field.
    pub fn from_definition(definition: &FieldDefinition) -> Result<Self, GeneratorError> {
        let name = definition.name.as_str();
        let has_choices = !definition.possible_values.is_empty()
            || !definition.possible_values_weighted.is_empty();

        if has_choices {
            if !definition.kind.is_structured() && !definition.kind.is_increment() {
                return possible_values(definition).map(FieldGenerator::OneOf);
            }
            warn!(
                "Field '{name}': possible values are ignored for type {}",
                definition.kind
            );
        }

        let length = definition.length.unwrap_or(text::DEFAULT_STRING_LENGTH);
        let generator = match definition.kind {
            FieldKind::String => FieldGenerator::Alphanumeric { length },
            FieldKind::StringAz => FieldGenerator::Uppercase { length },
            FieldKind::Integer => FieldGenerator::Integer {
                min: definition
                    .min
                    .map_or(i32::MIN, |b| numeric::clamp_to_i32(b.as_i64())),
                max: definition
                    .max
                    .map_or(i32::MAX, |b| numeric::clamp_to_i32(b.as_i64())),
            },
            FieldKind::IncrementInteger => FieldGenerator::IncrementInteger {
                start: definition
                    .min
                    .map_or(0, |b| numeric::clamp_to_i32(b.as_i64())),
            },
            FieldKind::Long => FieldGenerator::Long {
                min: definition.min.map_or(i64::MIN, |b| b.as_i64()),
                max: definition.max.map_or(i64::MAX, |b| b.as_i64()),
            },
            FieldKind::IncrementLong => FieldGenerator::IncrementLong {
                start: definition.min.map_or(0, |b| b.as_i64()),
            },
            FieldKind::Float => {
                let min = definition.min.map(|b| b.as_f64());
                let max = definition.max.map(|b| b.as_f64());
                // Unset bounds default to [0, 1], widened to include the other bound
                FieldGenerator::Float {
                    min: min.unwrap_or_else(|| max.map_or(0.0, |m| m.min(0.0))),
                    max: max.unwrap_or_else(|| min.map_or(1.0, |m| m.max(1.0))),
                }
            }
            FieldKind::Boolean => FieldGenerator::Boolean,
            FieldKind::Timestamp => FieldGenerator::Timestamp,
            FieldKind::Birthdate => {
                let min = definition
                    .min_date
                    .unwrap_or_else(|| temporal::ymd(temporal::DEFAULT_MIN_BIRTHDATE));
                let max = definition
                    .max_date
                    .unwrap_or_else(|| temporal::ymd(temporal::DEFAULT_MAX_BIRTHDATE));
                FieldGenerator::Birthdate { min, max }
            }
            FieldKind::Date => FieldGenerator::DateTime(DateTimeRange::from_definition(definition)),
            FieldKind::DateAsString => FieldGenerator::DateText {
                range: DateTimeRange::from_definition(definition),
                pattern: date_pattern(definition)?,
            },
            FieldKind::Bytes => FieldGenerator::Bytes { length },
            FieldKind::HashMd5 => FieldGenerator::HashMd5 { length },
            FieldKind::StringRegex => {
                let template = definition.regex.as_deref().ok_or_else(|| {
                    SchemaError::MissingOption {
                        field: name.to_string(),
                        kind: definition.kind,
                        option: "regex",
                    }
                })?;
                FieldGenerator::Template(CharTemplate::parse(name, template)?)
            }
            FieldKind::Uuid => FieldGenerator::Uuid,
            FieldKind::Ip => FieldGenerator::Ip,
            FieldKind::Email => FieldGenerator::Email {
                names: Pool::uniform(name, dictionary::names()?)?,
            },
            FieldKind::Phone => {
                let codes = dictionary::phone_codes()?;
                let codes = dictionary::filter_by_country(&codes, &definition.filters, |c| {
                    c.country.as_str()
                })
                .unwrap_or(codes);
                let mut indicators: Vec<String> = Vec::new();
                for code in codes {
                    if !indicators.contains(&code.indicator) {
                        indicators.push(code.indicator);
                    }
                }
                FieldGenerator::Phone {
                    indicators: Pool::uniform(name, indicators)?,
                }
            }
            FieldKind::Country => {
                let countries = dictionary::countries()?;
                let countries = dictionary::filter_by_country(&countries, &definition.filters, |c| {
                    c.as_str()
                })
                .unwrap_or(countries);
                FieldGenerator::Country(Pool::uniform(name, countries)?)
            }
            FieldKind::City => FieldGenerator::City(city_pool(name, &definition.filters)?),
            FieldKind::Name => {
                let names = dictionary::names()?;
                let names = dictionary::filter_by_country(&names, &definition.filters, |n| {
                    n.country.as_str()
                })
                .unwrap_or(names);
                FieldGenerator::Name(Pool::uniform(name, names)?)
            }
            FieldKind::Csv => {
                let records = csv_lookup::load_field_records(definition)?.ok_or_else(|| {
                    GeneratorError::EmptyPool {
                        field: name.to_string(),
                    }
                })?;
                FieldGenerator::Csv(Pool::uniform(name, records)?)
            }
        };
        Ok(generator)
    }

    /// Generate a value using the given RNG and global row index.
    pub fn generate<R: Rng>(&self, rng: &mut R, index: u64) -> FieldValue {
        match self {
            FieldGenerator::Alphanumeric { length } => text::generate_alphanumeric(rng, *length),
            FieldGenerator::Uppercase { length } => text::generate_uppercase(rng, *length),
            FieldGenerator::Integer { min, max } => numeric::generate_int_range(rng, *min, *max),
            FieldGenerator::IncrementInteger { start } => {
                numeric::generate_increment_int(*start, index)
            }
            FieldGenerator::Long { min, max } => numeric::generate_long_range(rng, *min, *max),
            FieldGenerator::IncrementLong { start } => {
                numeric::generate_increment_long(*start, index)
            }
            FieldGenerator::Float { min, max } => numeric::generate_float_range(rng, *min, *max),
            FieldGenerator::Boolean => FieldValue::Boolean(rng.random_bool(0.5)),
            FieldGenerator::Timestamp => temporal::generate_timestamp_now(),
            FieldGenerator::Birthdate { min, max } => {
                temporal::generate_date_range(rng, *min, *max)
            }
            FieldGenerator::DateTime(range) => FieldValue::DateTime(range.generate(rng)),
            FieldGenerator::DateText { range, pattern } => {
                FieldValue::Text(temporal::format_date_time(range.generate(rng), pattern))
            }
            FieldGenerator::Bytes { length } => text::generate_bytes(rng, *length),
            FieldGenerator::HashMd5 { length } => text::generate_md5(rng, *length),
            FieldGenerator::Template(template) => FieldValue::Text(template.generate(rng)),
            FieldGenerator::Uuid => text::generate_uuid_v4(rng),
            FieldGenerator::Ip => text::generate_ipv4(rng),
            FieldGenerator::Email { names } => contact::generate_email(rng, names),
            FieldGenerator::Phone { indicators } => contact::generate_phone(rng, indicators),
            FieldGenerator::Country(countries) => FieldValue::Text(countries.choose(rng).clone()),
            FieldGenerator::City(cities) => FieldValue::City(Arc::clone(cities.choose(rng))),
            FieldGenerator::Name(names) => FieldValue::Name(Arc::clone(names.choose(rng))),
            FieldGenerator::Csv(records) => FieldValue::Csv(Arc::clone(records.choose(rng))),
            FieldGenerator::OneOf(values) => values.choose(rng).clone(),
        }
    }
}

/// The checked strftime pattern of a `date_as_string` field.
fn date_pattern(definition: &FieldDefinition) -> Result<String, GeneratorError> {
    let pattern = definition
        .pattern
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(temporal::DEFAULT_DATE_PATTERN);
    if !temporal::is_valid_pattern(pattern) {
        return Err(GeneratorError::InvalidDatePattern {
            field: definition.name.clone(),
            pattern: pattern.to_string(),
        });
    }
    Ok(pattern.to_string())
}

/// Cities restricted by country, weighted by population.
///
/// Each city counts `population / smallest_population + 1` times. Without
/// filters, or when no city matches, every city is equally likely.
fn city_pool(field: &str, filters: &[String]) -> Result<Pool<Arc<City>>, GeneratorError> {
    let cities = dictionary::cities()?;
    match dictionary::filter_by_country(&cities, filters, |c| c.country.as_str()) {
        Some(filtered) => {
            let smallest = filtered
                .iter()
                .map(|c| c.population)
                .min()
                .unwrap_or(1)
                .max(1);
            let weighted = filtered
                .into_iter()
                .map(|city| {
                    let weight = city.population / smallest + 1;
                    (city, weight)
                })
                .collect();
            Pool::weighted(field, weighted)
        }
        None => Pool::uniform(field, cities),
    }
}

/// Parse `possible_values` (weight 1 each) and `possible_values_weighted`.
fn possible_values(definition: &FieldDefinition) -> Result<Pool<FieldValue>, GeneratorError> {
    let parse = |value: &str| {
        parse_scalar(value, definition.kind).ok_or_else(|| GeneratorError::InvalidPossibleValue {
            field: definition.name.clone(),
            value: value.to_string(),
            kind: definition.kind,
        })
    };

    if definition.possible_values_weighted.is_empty() {
        let values = definition
            .possible_values
            .iter()
            .map(|v| parse(v))
            .collect::<Result<Vec<_>, _>>()?;
        return Pool::uniform(&definition.name, values);
    }

    let plain = definition.possible_values.iter().map(|v| (v.as_str(), 1u64));
    let weighted = definition
        .possible_values_weighted
        .iter()
        .map(|(v, w)| (v.as_str(), u64::from(*w)));
    let values = plain
        .chain(weighted)
        .map(|(v, w)| parse(v).map(|value| (value, w)))
        .collect::<Result<Vec<_>, _>>()?;
    Pool::weighted(&definition.name, values)
}
