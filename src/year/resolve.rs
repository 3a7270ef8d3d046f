use serde::Serialize;

use crate::year::estimate::YearEstimator;
use crate::year::normalize::YearBounds;

/// The three year columns derived for every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedYear {
    pub entry_year_real: Option<i32>,
    pub entry_year_est: Option<i32>,
    pub entry_year_used: Option<i32>,
}

impl ResolvedYear {
    pub fn is_estimated(&self) -> bool {
        self.entry_year_real.is_none() && self.entry_year_used.is_some()
    }
}

/// Combines the normalizer and estimator: the real year when valid, else the
/// estimate, else unknown.
#[derive(Debug, Clone)]
pub struct YearResolver {
    bounds: YearBounds,
    estimator: YearEstimator,
}

impl YearResolver {
    pub fn new(bounds: YearBounds, estimator: YearEstimator) -> Self {
        Self { bounds, estimator }
    }

    pub fn bounds(&self) -> YearBounds {
        self.bounds
    }

    pub fn estimator(&self) -> &YearEstimator {
        &self.estimator
    }

    /// Estimates are checked against the same bounds as real years, so a
    /// table entry later than the reference date stays unknown.
    pub fn resolve(&self, raw_year: Option<&str>, model_key: Option<&str>) -> ResolvedYear {
        let entry_year_real = self.bounds.normalize(raw_year);
        let entry_year_est = self
            .estimator
            .estimate(model_key)
            .and_then(|y| self.bounds.check(y));

        ResolvedYear {
            entry_year_real,
            entry_year_est,
            entry_year_used: entry_year_real.or(entry_year_est),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn resolver(year: i32) -> YearResolver {
        let date = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        YearResolver::new(YearBounds::for_date(date), YearEstimator::builtin())
    }

    #[test]
    fn test_real_year_wins_over_estimate() {
        let r = resolver(2024).resolve(Some("2019"), Some("A20N"));
        assert_eq!(r.entry_year_real, Some(2019));
        assert_eq!(r.entry_year_est, Some(2016));
        assert_eq!(r.entry_year_used, Some(2019));
        assert!(!r.is_estimated());
    }

    #[test]
    fn test_falls_back_to_estimate() {
        let r = resolver(2024).resolve(Some("1850"), Some("B789"));
        assert_eq!(r.entry_year_real, None);
        assert_eq!(r.entry_year_used, Some(2014));
        assert!(r.is_estimated());
    }

    #[test]
    fn test_unknown_when_nothing_resolves() {
        let r = resolver(2024).resolve(None, Some("ZZZZ"));
        assert_eq!(r, ResolvedYear::default());
    }

    #[test]
    fn test_estimate_after_reference_year_is_unknown() {
        let r = resolver(2020).resolve(None, Some("C919"));
        assert_eq!(r.entry_year_est, None);
        assert_eq!(r.entry_year_used, None);

        let r = resolver(2023).resolve(None, Some("C919"));
        assert_eq!(r.entry_year_used, Some(2023));
    }
}
