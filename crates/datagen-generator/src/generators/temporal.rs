//! Date and timestamp value generators.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use datagen_core::{FieldValue, DATE_TIME_FORMAT};
use rand::Rng;
use std::fmt::Write;

/// Default lower bound of generated birthdates.
pub const DEFAULT_MIN_BIRTHDATE: (i32, u32, u32) = (1920, 1, 1);

/// Default upper bound of generated birthdates.
pub const DEFAULT_MAX_BIRTHDATE: (i32, u32, u32) = (2024, 1, 1);

/// Default upper bound of generated date-times, in epoch seconds
/// (9999-12-31T23:59:59). The lower bound defaults to the epoch.
pub const DEFAULT_MAX_DATE_TIME_SECS: i64 = 253_402_300_799;

/// Pattern of `date_as_string` values when none is set.
pub const DEFAULT_DATE_PATTERN: &str = DATE_TIME_FORMAT;

/// Resolve a `(year, month, day)` constant.
pub fn ymd(date: (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap_or_default()
}

/// Generate the current time as epoch milliseconds.
///
/// This is NOT deterministic - each call returns the current time.
pub fn generate_timestamp_now() -> FieldValue {
    FieldValue::Long(Utc::now().timestamp_millis())
}

/// Generate a date uniformly between `min` and `max` (inclusive).
pub fn generate_date_range<R: Rng>(rng: &mut R, min: NaiveDate, max: NaiveDate) -> FieldValue {
    if min >= max {
        return FieldValue::Date(min);
    }
    let span = (max - min).num_days();
    let offset = rng.random_range(0..=span);
    FieldValue::Date(min + chrono::Duration::days(offset))
}

/// Resolve epoch seconds, clamping to the representable range.
pub fn from_epoch_secs(secs: i64) -> NaiveDateTime {
    DateTime::from_timestamp(secs, 0)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
        .naive_utc()
}

/// Whether `pattern` is a usable strftime pattern.
pub fn is_valid_pattern(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Generate a date-time uniformly between `min` and `max` (inclusive), to
/// the second.
pub fn generate_date_time_range<R: Rng>(
    rng: &mut R,
    min: NaiveDateTime,
    max: NaiveDateTime,
) -> NaiveDateTime {
    let (min, max) = (min.and_utc().timestamp(), max.and_utc().timestamp());
    if min >= max {
        return from_epoch_secs(min);
    }
    from_epoch_secs(rng.random_range(min..=max))
}

/// The current time, truncated to the second.
pub fn now() -> NaiveDateTime {
    from_epoch_secs(Utc::now().timestamp())
}

/// Render a date-time with a strftime pattern.
///
/// Falls back to the default pattern if formatting fails, which a pattern
/// checked by [`is_valid_pattern`] does not.
pub fn format_date_time(value: NaiveDateTime, pattern: &str) -> String {
    let mut text = String::new();
    if write!(text, "{}", value.format(pattern)).is_err() {
        text.clear();
        text.push_str(&value.format(DEFAULT_DATE_PATTERN).to_string());
    }
    text
}
