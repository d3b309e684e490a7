//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::{Float, PrimInt, Signed};

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)` for integers.
///
/// Used for circular lookups, where an index may step off either end of a
/// buffer and must wrap around to the other side.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: PrimInt + Signed
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Convert an absolute angle in degrees, in the range [0, 360), into the 
/// equivalent signed angle in the range (-180, 180].
///
/// This is the shortest rotation which reaches `angle_deg` from zero.
pub fn to_signed_deg<T>(angle_deg: T) -> T
where
    T: PrimInt + Signed
{
    let full = T::from(360).unwrap_or_else(T::max_value);
    let half = T::from(180).unwrap_or_else(T::max_value);

    let wrapped = rem_euclid(angle_deg, full);

    if wrapped > half {
        wrapped - full
    }
    else {
        wrapped
    }
}

/// Integer mean of a set of readings, truncated towards zero.
///
/// Returns zero for an empty set.
pub fn int_mean(values: &[u32]) -> u32 {
    if values.is_empty() {
        return 0;
    }

    let sum: u64 = values.iter().map(|&v| v as u64).sum();
    (sum / values.len() as u64) as u32
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 255f64), (0f64, 1000f64), 127.5), 500.0);
        assert_eq!(lin_map((-1f64, 1f64), (1f64, -1f64), 0.5), -0.5);
    }

    #[test]
    fn test_rem_euclid() {
        assert_eq!(rem_euclid(-5i32, 360), 355);
        assert_eq!(rem_euclid(364i32, 360), 4);
        assert_eq!(rem_euclid(0isize, 360), 0);
    }

    #[test]
    fn test_to_signed_deg() {
        assert_eq!(to_signed_deg(90i32), 90);
        assert_eq!(to_signed_deg(180i32), 180);
        assert_eq!(to_signed_deg(181i32), -179);
        assert_eq!(to_signed_deg(270i32), -90);
        assert_eq!(to_signed_deg(359i32), -1);
        assert_eq!(to_signed_deg(-90i32), -90);
    }

    #[test]
    fn test_int_mean() {
        assert_eq!(int_mean(&[1000, 1001, 1003]), 1001);
        assert_eq!(int_mean(&[]), 0);
    }
}
