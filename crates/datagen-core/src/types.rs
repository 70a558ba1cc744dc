//! Field kinds and the value kinds conditions compare with.
//!
//! `FieldKind` is the closed set of generators a model field can declare.
//! `ValueKind` is the coarser classification the rule engine uses to decide
//! between numeric and lexical comparison.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a model field, as written in the `type:` key of a model file.
///
/// # YAML Format
///
/// ```yaml
/// type: integer
/// type: increment_long
/// type: city
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Random alphanumeric string
    String,
    /// Random uppercase A-Z string
    StringAz,
    /// 32-bit integer in `[min, max]`
    Integer,
    /// 32-bit integer equal to `min + row index`
    IncrementInteger,
    /// 64-bit integer in `[min, max]`
    Long,
    /// 64-bit integer equal to `min + row index`
    IncrementLong,
    /// 64-bit float in `[min, max]`
    Float,
    /// Fair coin
    Boolean,
    /// Epoch milliseconds
    Timestamp,
    /// Calendar date between `min_date` and `max_date`
    Birthdate,
    /// Random v4 UUID
    Uuid,
    /// Email address built from the name dictionary
    Email,
    /// Phone number
    Phone,
    /// Dotted IPv4 address
    Ip,
    /// Country name
    Country,
    /// City from the built-in dictionary (structured)
    City,
    /// First name from the built-in dictionary (structured)
    Name,
    /// Row of an external CSV file (structured)
    Csv,
    /// Date-time between `min_date_time` and `max_date_time`, to the second
    Date,
    /// Date-time rendered as text with `pattern`
    DateAsString,
    /// Random bytes, rendered as uppercase hex
    Bytes,
    /// MD5 digest of a random alphanumeric string
    HashMd5,
    /// Text built from the `[choices]{count}` template in `regex`
    StringRegex,
}

impl FieldKind {
    /// All kinds, in declaration order.
    pub const ALL: [FieldKind; 23] = [
        FieldKind::String,
        FieldKind::StringAz,
        FieldKind::Integer,
        FieldKind::IncrementInteger,
        FieldKind::Long,
        FieldKind::IncrementLong,
        FieldKind::Float,
        FieldKind::Boolean,
        FieldKind::Timestamp,
        FieldKind::Birthdate,
        FieldKind::Uuid,
        FieldKind::Email,
        FieldKind::Phone,
        FieldKind::Ip,
        FieldKind::Country,
        FieldKind::City,
        FieldKind::Name,
        FieldKind::Csv,
        FieldKind::Date,
        FieldKind::DateAsString,
        FieldKind::Bytes,
        FieldKind::HashMd5,
        FieldKind::StringRegex,
    ];

    /// The value kind conditions on this field compare with.
    pub fn value_kind(self) -> ValueKind {
        match self {
            FieldKind::Integer | FieldKind::IncrementInteger => ValueKind::Integer,
            FieldKind::Long | FieldKind::IncrementLong | FieldKind::Timestamp => ValueKind::Long,
            FieldKind::Float => ValueKind::Float,
            FieldKind::String
            | FieldKind::StringAz
            | FieldKind::Boolean
            | FieldKind::Birthdate
            | FieldKind::Uuid
            | FieldKind::Email
            | FieldKind::Phone
            | FieldKind::Ip
            | FieldKind::Country
            | FieldKind::City
            | FieldKind::Name
            | FieldKind::Csv
            | FieldKind::Date
            | FieldKind::DateAsString
            | FieldKind::Bytes
            | FieldKind::HashMd5
            | FieldKind::StringRegex => ValueKind::String,
        }
    }

    /// Whether values of this kind carry named attributes a link can read.
    pub fn is_structured(self) -> bool {
        matches!(self, FieldKind::City | FieldKind::Name | FieldKind::Csv)
    }

    /// Whether the value is derived from the row index rather than the RNG.
    pub fn is_increment(self) -> bool {
        matches!(self, FieldKind::IncrementInteger | FieldKind::IncrementLong)
    }

    /// The YAML name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::StringAz => "string_az",
            FieldKind::Integer => "integer",
            FieldKind::IncrementInteger => "increment_integer",
            FieldKind::Long => "long",
            FieldKind::IncrementLong => "increment_long",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Birthdate => "birthdate",
            FieldKind::Uuid => "uuid",
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::Ip => "ip",
            FieldKind::Country => "country",
            FieldKind::City => "city",
            FieldKind::Name => "name",
            FieldKind::Csv => "csv",
            FieldKind::Date => "date",
            FieldKind::DateAsString => "date_as_string",
            FieldKind::Bytes => "bytes",
            FieldKind::HashMd5 => "hash_md5",
            FieldKind::StringRegex => "string_regex",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a condition interprets the two sides it compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Integer,
    Long,
    Float,
    String,
}

impl ValueKind {
    /// `<` and `>` compare numerically for numeric kinds.
    pub fn is_numeric(self) -> bool {
        !matches!(self, ValueKind::String)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Integer => "integer",
            ValueKind::Long => "long",
            ValueKind::Float => "float",
            ValueKind::String => "string",
        };
        f.write_str(name)
    }
}

/// Lookup of field kinds by name.
///
/// Rule sets are bound against this before any row is generated.
pub trait FieldTypes {
    /// The kind of the named field, if the model declares it.
    fn field_kind(&self, name: &str) -> Option<FieldKind>;
}

impl FieldTypes for indexmap::IndexMap<String, FieldKind> {
    fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.get(name).copied()
    }
}
