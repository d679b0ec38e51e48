//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: u32) -> f64 {
    cast::<u32, f64>(value).unwrap_or(0.0)
}

/// Convert a usize index or length to u32, saturating at `u32::MAX`.
#[must_use]
pub fn usize_to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Percentage `part / whole * 100`, clamped to `[0, 100]`. Returns 0.0 when
/// `whole` is zero or either input is non-finite.
#[must_use]
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if !part.is_finite() || !whole.is_finite() || whole <= 0.0 {
        return 0.0;
    }
    (part / whole * 100.0).clamp(0.0, 100.0)
}

/// Clamp a percentage-like stat into `[0, 100]`, mapping NaN to zero.
#[must_use]
pub fn clamp_pct(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_handles_zero_and_non_finite() {
        assert!((percent_of(5.0, 0.0) - 0.0).abs() < f64::EPSILON);
        assert!((percent_of(f64::NAN, 10.0) - 0.0).abs() < f64::EPSILON);
        assert!((percent_of(1.0, 4.0) - 25.0).abs() < f64::EPSILON);
        assert!((percent_of(12.0, 4.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clamp_pct_bounds() {
        assert!((clamp_pct(-3.0) - 0.0).abs() < f64::EPSILON);
        assert!((clamp_pct(250.0) - 100.0).abs() < f64::EPSILON);
        assert!((clamp_pct(f64::NAN) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn conversions_saturate() {
        assert!((count_to_f64(7) - 7.0).abs() < f64::EPSILON);
        assert_eq!(usize_to_u32(12), 12);
    }
}
