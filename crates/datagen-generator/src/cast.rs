//! Casting rule output text back to a field's kind.

use crate::dictionary;
use crate::error::GeneratorError;
use crate::generators::{csv_lookup, text::md5_digest};
use chrono::{NaiveDate, NaiveDateTime};
use datagen_core::{FieldDefinition, FieldKind, FieldValue};
use std::collections::HashMap;

/// Parse text as a non-structured kind.
///
/// Integral kinds accept a float string and truncate it. `date` accepts
/// `YYYY-MM-DDTHH:MM:SS` with an optional trailing `Z`, `bytes` takes the
/// UTF-8 bytes of the text and `hash_md5` its digest. Returns `None` for
/// empty or unparsable text and for structured kinds.
pub fn parse_scalar(text: &str, kind: FieldKind) -> Option<FieldValue> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match kind {
        FieldKind::Integer | FieldKind::IncrementInteger => trimmed
            .parse::<i32>()
            .ok()
            .or_else(|| truncate(trimmed, i32::MIN as f64, i32::MAX as f64).map(|v| v as i32))
            .map(FieldValue::Integer),
        FieldKind::Long | FieldKind::IncrementLong | FieldKind::Timestamp => trimmed
            .parse::<i64>()
            .ok()
            .or_else(|| truncate(trimmed, i64::MIN as f64, i64::MAX as f64).map(|v| v as i64))
            .map(FieldValue::Long),
        FieldKind::Float => trimmed.parse::<f64>().ok().map(FieldValue::Float),
        FieldKind::Boolean => {
            if trimmed.eq_ignore_ascii_case("true") {
                Some(FieldValue::Boolean(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Some(FieldValue::Boolean(false))
            } else {
                None
            }
        }
        FieldKind::Birthdate => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .map(FieldValue::Date),
        FieldKind::Date => {
            NaiveDateTime::parse_from_str(trimmed.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(FieldValue::DateTime)
        }
        FieldKind::Bytes => Some(FieldValue::Bytes(text.as_bytes().to_vec())),
        FieldKind::HashMd5 => Some(FieldValue::Bytes(md5_digest(text))),
        FieldKind::City | FieldKind::Name | FieldKind::Csv => None,
        FieldKind::DateAsString
        | FieldKind::StringRegex
        | FieldKind::String
        | FieldKind::StringAz
        | FieldKind::Uuid
        | FieldKind::Email
        | FieldKind::Phone
        | FieldKind::Ip
        | FieldKind::Country => Some(FieldValue::Text(text.to_string())),
    }
}

fn truncate(text: &str, min: f64, max: f64) -> Option<f64> {
    let value = text.parse::<f64>().ok()?.trunc();
    (value.is_finite() && value >= min && value <= max).then_some(value)
}

/// Casts the output of a computed field to the field's kind.
///
/// Structured kinds resolve the text by display name, ignoring case.
#[derive(Debug, Clone)]
pub enum ValueCaster {
    Scalar(FieldKind),
    Lookup(HashMap<String, FieldValue>),
}

impl ValueCaster {
    pub fn for_field(definition: &FieldDefinition) -> Result<Self, GeneratorError> {
        let entries: Vec<FieldValue> = match definition.kind {
            FieldKind::City => dictionary::cities()?
                .into_iter()
                .map(FieldValue::City)
                .collect(),
            FieldKind::Name => dictionary::names()?
                .into_iter()
                .map(FieldValue::Name)
                .collect(),
            FieldKind::Csv => match csv_lookup::load_field_records(definition)? {
                Some(records) => records.into_iter().map(FieldValue::Csv).collect(),
                // Without a file the output stays plain text
                None => return Ok(ValueCaster::Scalar(FieldKind::String)),
            },
            kind => return Ok(ValueCaster::Scalar(kind)),
        };

        let mut lookup = HashMap::with_capacity(entries.len());
        for value in entries {
            // First entry wins on duplicate display names
            lookup
                .entry(value.to_string_value().to_lowercase())
                .or_insert(value);
        }
        Ok(ValueCaster::Lookup(lookup))
    }

    /// Cast rule output; `None` when it is empty or cannot be cast.
    pub fn cast(&self, text: &str) -> Option<FieldValue> {
        match self {
            ValueCaster::Scalar(kind) => parse_scalar(text, *kind),
            ValueCaster::Lookup(lookup) => lookup.get(&text.trim().to_lowercase()).cloned(),
        }
    }
}

impl From<FieldKind> for ValueCaster {
    fn from(kind: FieldKind) -> Self {
        ValueCaster::Scalar(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integers() {
        assert_eq!(parse_scalar("42", FieldKind::Integer), Some(FieldValue::Integer(42)));
        assert_eq!(parse_scalar(" 7.9 ", FieldKind::Integer), Some(FieldValue::Integer(7)));
        assert_eq!(parse_scalar("-2.5", FieldKind::Long), Some(FieldValue::Long(-2)));
        assert_eq!(parse_scalar("1e30", FieldKind::Integer), None);
        assert_eq!(parse_scalar("abc", FieldKind::Long), None);
        assert_eq!(parse_scalar("", FieldKind::Integer), None);
    }

    #[test]
    fn test_parse_other_scalars() {
        assert_eq!(parse_scalar("0.5", FieldKind::Float), Some(FieldValue::Float(0.5)));
        assert_eq!(parse_scalar("TRUE", FieldKind::Boolean), Some(FieldValue::Boolean(true)));
        assert_eq!(parse_scalar("yes", FieldKind::Boolean), None);
        assert_eq!(
            parse_scalar("1990-05-17", FieldKind::Birthdate),
            NaiveDate::from_ymd_opt(1990, 5, 17).map(FieldValue::Date)
        );
        assert_eq!(parse_scalar("hi", FieldKind::String), Some(FieldValue::from("hi")));
        assert_eq!(parse_scalar("Paris", FieldKind::City), None);
    }

    #[test]
    fn test_parse_date_time_and_binary() {
        let expected = NaiveDate::from_ymd_opt(2023, 11, 5)
            .and_then(|d| d.and_hms_opt(18, 4, 0))
            .map(FieldValue::DateTime);
        assert_eq!(parse_scalar("2023-11-05T18:04:00Z", FieldKind::Date), expected);
        assert_eq!(parse_scalar("2023-11-05T18:04:00", FieldKind::Date), expected);
        assert_eq!(parse_scalar("2023-11-05", FieldKind::Date), None);
        assert_eq!(
            parse_scalar("05/11/2023", FieldKind::DateAsString),
            Some(FieldValue::from("05/11/2023"))
        );

        assert_eq!(
            parse_scalar("AB", FieldKind::Bytes),
            Some(FieldValue::Bytes(vec![b'A', b'B']))
        );
        let digest = parse_scalar("hello", FieldKind::HashMd5).unwrap();
        assert_eq!(digest.to_string_value(), "5D41402ABC4B2A76B9719D911017C592");
        assert_eq!(
            parse_scalar("XY-12", FieldKind::StringRegex),
            Some(FieldValue::from("XY-12"))
        );
    }

    #[test]
    fn test_city_lookup() {
        let caster = ValueCaster::for_field(&FieldDefinition::new("c", FieldKind::City)).unwrap();
        let paris = caster.cast("paris").unwrap();
        assert_eq!(paris.as_city().map(|c| c.country.as_str()), Some("France"));
        assert_eq!(caster.cast("Atlantis"), None);
        assert_eq!(caster.cast(""), None);
    }

    #[test]
    fn test_scalar_caster() {
        let caster = ValueCaster::for_field(&FieldDefinition::new("n", FieldKind::Integer)).unwrap();
        assert_eq!(caster.cast("5"), Some(FieldValue::Integer(5)));

        let csv = ValueCaster::for_field(&FieldDefinition::new("p", FieldKind::Csv)).unwrap();
        assert_eq!(csv.cast("Kettle"), Some(FieldValue::from("Kettle")));
    }
}
