//! Email and phone number generators.

use super::choice::Pool;
use datagen_core::{FieldValue, PersonName};
use rand::distr::{Alphanumeric, SampleString};
use rand::Rng;
use std::sync::Arc;

/// Domains used for generated emails.
pub const EMAIL_DOMAINS: [&str; 4] = ["gaagle.com", "yahaa.com", "uutlook.com", "email.fr"];

/// Total digits of a phone number, indicator included.
pub const PHONE_DIGITS: usize = 11;

/// Generate `<prefix><name>@<domain>`.
///
/// The prefix is either one alphanumeric character or another name
/// followed by a dot.
pub fn generate_email<R: Rng>(rng: &mut R, names: &Pool<Arc<PersonName>>) -> FieldValue {
    let prefix = if rng.random_bool(0.5) {
        Alphanumeric.sample_string(rng, 1)
    } else {
        format!("{}.", names.choose(rng).first_name)
    };
    let name = &names.choose(rng).first_name;
    let domain = EMAIL_DOMAINS[rng.random_range(0..EMAIL_DOMAINS.len())];
    FieldValue::Text(format!("{prefix}{name}@{domain}"))
}

/// Generate `+<indicator> <digits>` with [`PHONE_DIGITS`] digits in total.
pub fn generate_phone<R: Rng>(rng: &mut R, indicators: &Pool<String>) -> FieldValue {
    let indicator = indicators.choose(rng);
    let mut phone = String::with_capacity(PHONE_DIGITS + 2);
    phone.push('+');
    phone.push_str(indicator);
    phone.push(' ');
    for _ in 0..PHONE_DIGITS.saturating_sub(indicator.len()) {
        phone.push(char::from(b'0' + rng.random_range(0..10u8)));
    }
    FieldValue::Text(phone)
}
