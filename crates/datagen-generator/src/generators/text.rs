//! Text, identifier and network value generators.

use datagen_core::FieldValue;
use md5::{Digest, Md5};
use rand::distr::{Alphanumeric, SampleString};
use rand::Rng;
use uuid::Uuid;

/// Default length of generated strings.
pub const DEFAULT_STRING_LENGTH: usize = 20;

/// Generate random alphanumeric characters.
pub fn generate_alphanumeric<R: Rng>(rng: &mut R, length: usize) -> FieldValue {
    FieldValue::Text(Alphanumeric.sample_string(rng, length))
}

/// Generate random uppercase letters (`A`-`Z`).
pub fn generate_uppercase<R: Rng>(rng: &mut R, length: usize) -> FieldValue {
    let text = (0..length)
        .map(|_| char::from(rng.random_range(b'A'..=b'Z')))
        .collect();
    FieldValue::Text(text)
}

/// Generate `length` random bytes.
pub fn generate_bytes<R: Rng>(rng: &mut R, length: usize) -> FieldValue {
    let mut bytes = vec![0u8; length];
    rng.fill(bytes.as_mut_slice());
    FieldValue::Bytes(bytes)
}

/// MD5 digest of `text`.
pub fn md5_digest(text: &str) -> Vec<u8> {
    Md5::digest(text.as_bytes()).to_vec()
}

/// Generate the MD5 digest of a random alphanumeric string of `length`.
pub fn generate_md5<R: Rng>(rng: &mut R, length: usize) -> FieldValue {
    FieldValue::Bytes(md5_digest(&Alphanumeric.sample_string(rng, length)))
}

/// Generate a random UUID v4 using the provided RNG.
pub fn generate_uuid_v4<R: Rng>(rng: &mut R) -> FieldValue {
    // Generate 16 random bytes
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);

    // Set version (4) and variant (RFC 4122) bits
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    FieldValue::Text(Uuid::from_bytes(bytes).to_string())
}

/// Generate a dotted IPv4 address.
pub fn generate_ipv4<R: Rng>(rng: &mut R) -> FieldValue {
    let [a, b, c, d]: [u8; 4] = rng.random();
    FieldValue::Text(format!("{a}.{b}.{c}.{d}"))
}
