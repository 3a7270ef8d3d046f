/// Rounds to two decimal places, the precision of every published ratio.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of `part` in `total`, rounded to two decimals.
/// Returns `None` for an empty denominator.
pub fn pct(part: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(round2(part as f64 / total as f64 * 100.0))
}

/// Mean from a running sum, rounded to two decimals. Returns `None` for
/// an empty count.
pub fn mean(sum: i64, count: u64) -> Option<f64> {
    if count == 0 {
        return None;
    }
    Some(round2(sum as f64 / count as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(pct(10, 0), None);
    }

    #[test]
    fn test_pct_rounds_to_two_decimals() {
        assert_eq!(pct(5, 10), Some(50.0));
        assert_eq!(pct(1, 3), Some(33.33));
        assert_eq!(pct(2, 3), Some(66.67));
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(0, 0), None);
        assert_eq!(mean(4030, 2), Some(2015.0));
        assert_eq!(mean(6046, 3), Some(2015.33));
    }
}
