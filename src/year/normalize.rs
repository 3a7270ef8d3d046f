//! Validation of raw entry-year values.

use chrono::{Datelike, NaiveDate, Utc};

/// Earliest plausible entry-into-service year.
pub const MIN_ENTRY_YEAR: i32 = 1900;

/// Text values upstream cleaning uses for "no value".
const MISSING_SENTINELS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "-"];

/// True when the raw cell carries no value at all, as opposed to a value
/// that fails validation.
pub fn is_missing(raw: Option<&str>) -> bool {
    raw.is_none_or(|s| MISSING_SENTINELS.contains(&s.trim()))
}

/// Inclusive range of accepted years, derived from an injected reference
/// date rather than the system clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearBounds {
    pub min: i32,
    pub max: i32,
}

impl YearBounds {
    pub fn for_date(reference: NaiveDate) -> Self {
        Self {
            min: MIN_ENTRY_YEAR,
            max: reference.year(),
        }
    }

    /// Bounds for today's UTC date. Only the binary should call this; library
    /// code takes bounds as input.
    pub fn today() -> Self {
        Self::for_date(Utc::now().date_naive())
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }

    /// Returns `Some(year)` iff the year is within bounds.
    pub fn check(&self, year: i32) -> Option<i32> {
        self.contains(year).then_some(year)
    }

    /// Normalizes a raw year cell.
    ///
    /// Accepts integers and integral decimals (`"2015"`, `"2015.0"`). Missing
    /// sentinels, non-numeric text, fractional values and anything outside
    /// the bounds yield `None`.
    pub fn normalize(&self, raw: Option<&str>) -> Option<i32> {
        if is_missing(raw) {
            return None;
        }
        let text = raw?.trim();

        let value: f64 = text.parse().ok()?;
        if !value.is_finite() || value.fract() != 0.0 {
            return None;
        }
        if value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
            return None;
        }

        self.check(value as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> YearBounds {
        YearBounds::for_date(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
    }

    #[test]
    fn test_bounds_follow_reference_date() {
        let b = bounds();
        assert_eq!(b.min, 1900);
        assert_eq!(b.max, 2024);
    }

    #[test]
    fn test_normalize_range_edges() {
        let b = bounds();
        assert_eq!(b.normalize(Some("1900")), Some(1900));
        assert_eq!(b.normalize(Some("2024")), Some(2024));
        assert_eq!(b.normalize(Some("1899")), None);
        assert_eq!(b.normalize(Some("2025")), None);
    }

    #[test]
    fn test_normalize_accepts_integral_decimals() {
        let b = bounds();
        assert_eq!(b.normalize(Some("2015.0")), Some(2015));
        assert_eq!(b.normalize(Some(" 1998 ")), Some(1998));
        assert_eq!(b.normalize(Some("2015.5")), None);
    }

    #[test]
    fn test_normalize_missing_and_garbage() {
        let b = bounds();
        assert_eq!(b.normalize(None), None);
        assert_eq!(b.normalize(Some("")), None);
        assert_eq!(b.normalize(Some("nan")), None);
        assert_eq!(b.normalize(Some("NULL")), None);
        assert_eq!(b.normalize(Some("unknown")), None);
        assert_eq!(b.normalize(Some("inf")), None);
        assert_eq!(b.normalize(Some("0")), None);
        assert_eq!(b.normalize(Some("-1")), None);
        assert_eq!(b.normalize(Some("1e12")), None);
    }

    #[test]
    fn test_is_missing() {
        assert!(is_missing(None));
        assert!(is_missing(Some(" NA ")));
        assert!(!is_missing(Some("1850")));
        assert!(!is_missing(Some("soon")));
    }
}
