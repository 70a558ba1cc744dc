//! Numeric value generators.

use datagen_core::FieldValue;
use rand::Rng;

/// Generate a random integer in the given range (inclusive).
pub fn generate_int_range<R: Rng>(rng: &mut R, min: i32, max: i32) -> FieldValue {
    FieldValue::Integer(rng.random_range(min..=max))
}

/// Generate a random long in the given range (inclusive).
pub fn generate_long_range<R: Rng>(rng: &mut R, min: i64, max: i64) -> FieldValue {
    FieldValue::Long(rng.random_range(min..=max))
}

/// Generate a random float in the given range (inclusive).
pub fn generate_float_range<R: Rng>(rng: &mut R, min: f64, max: f64) -> FieldValue {
    if min == max {
        return FieldValue::Float(min);
    }
    FieldValue::Float(rng.random_range(min..=max))
}

/// `start + index`, wrapping on overflow.
pub fn generate_increment_int(start: i32, index: u64) -> FieldValue {
    FieldValue::Integer(start.wrapping_add(index as i32))
}

/// `start + index`, wrapping on overflow.
pub fn generate_increment_long(start: i64, index: u64) -> FieldValue {
    FieldValue::Long(start.wrapping_add(index as i64))
}

/// Clamp a model bound into the `i32` range.
pub fn clamp_to_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_int_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let value = generate_int_range(&mut rng, 10, 20);
            if let FieldValue::Integer(v) = value {
                assert!((10..=20).contains(&v));
            } else {
                panic!("Expected Integer value");
            }
        }
    }

    #[test]
    fn test_generate_long_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let v = generate_long_range(&mut rng, 5_000_000_000, 5_000_000_010)
                .as_i64()
                .unwrap();
            assert!((5_000_000_000..=5_000_000_010).contains(&v));
        }
    }

    #[test]
    fn test_generate_float_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let v = generate_float_range(&mut rng, 0.0, 100.0).as_f64().unwrap();
            assert!((0.0..=100.0).contains(&v));
        }
        assert_eq!(generate_float_range(&mut rng, 2.5, 2.5), FieldValue::Float(2.5));
    }

    #[test]
    fn test_increment() {
        assert_eq!(generate_increment_int(100, 0), FieldValue::Integer(100));
        assert_eq!(generate_increment_int(100, 7), FieldValue::Integer(107));
        assert_eq!(generate_increment_long(-1, 1), FieldValue::Long(0));
    }

    #[test]
    fn test_clamp_to_i32() {
        assert_eq!(clamp_to_i32(12), 12);
        assert_eq!(clamp_to_i32(i64::MAX), i32::MAX);
        assert_eq!(clamp_to_i32(i64::MIN), i32::MIN);
    }
}
