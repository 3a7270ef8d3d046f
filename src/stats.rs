use std::collections::BTreeMap;

use serde::Serialize;

use crate::analyzers::utility::pct;
use crate::classify::{AircraftCategory, Oem};
use crate::record::ResolvedRecord;
use crate::year::normalize::is_missing;

/// Data-quality summary of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetStats {
    pub total_records: u64,

    // year coverage
    pub with_real_year: u64,
    pub with_estimated_year: u64,
    pub without_year: u64,
    /// Raw year present but outside the accepted range or non-numeric.
    pub rejected_raw_year: u64,

    // dimension gaps
    pub missing_airline: u64,
    pub missing_region: u64,

    pub by_category: BTreeMap<String, u64>,
    pub by_oem: BTreeMap<String, u64>,
}

impl DatasetStats {
    pub fn observe(&mut self, rec: &ResolvedRecord) {
        self.total_records += 1;

        if rec.year.entry_year_real.is_some() {
            self.with_real_year += 1;
        } else {
            if rec.year.is_estimated() {
                self.with_estimated_year += 1;
            } else {
                self.without_year += 1;
            }

            if !is_missing(rec.source.entry_year.as_deref()) {
                self.rejected_raw_year += 1;
            }
        }

        if rec.source.is_missing_airline() {
            self.missing_airline += 1;
        }

        if rec
            .source
            .region
            .as_deref()
            .is_none_or(|s| s.trim().is_empty())
        {
            self.missing_region += 1;
        }

        *self
            .by_category
            .entry(category_label(rec.aircraft_category))
            .or_default() += 1;
        *self
            .by_oem
            .entry(Oem::label_or_none(rec.oem).to_string())
            .or_default() += 1;
    }

    pub fn merge(&mut self, other: DatasetStats) {
        self.total_records += other.total_records;
        self.with_real_year += other.with_real_year;
        self.with_estimated_year += other.with_estimated_year;
        self.without_year += other.without_year;
        self.rejected_raw_year += other.rejected_raw_year;
        self.missing_airline += other.missing_airline;
        self.missing_region += other.missing_region;

        for (k, v) in other.by_category {
            *self.by_category.entry(k).or_default() += v;
        }
        for (k, v) in other.by_oem {
            *self.by_oem.entry(k).or_default() += v;
        }
    }

    /// Share of records with any usable year, real or estimated. `None` for
    /// an empty dataset.
    pub fn year_coverage_pct(&self) -> Option<f64> {
        pct(
            self.with_real_year + self.with_estimated_year,
            self.total_records,
        )
    }
}

fn category_label(category: AircraftCategory) -> String {
    category.label().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FleetRecord;
    use crate::year::ResolvedYear;

    #[test]
    fn test_empty_dataset_has_no_coverage() {
        assert_eq!(DatasetStats::default().year_coverage_pct(), None);
    }

    #[test]
    fn test_observe_year_buckets() {
        let mut stats = DatasetStats::default();
        stats.observe(&rec(Some("2012"), Some(2012), Some(2012)));
        stats.observe(&rec(Some("1850"), None, Some(1998)));
        stats.observe(&rec(None, None, Some(1998)));
        stats.observe(&rec(Some("nan"), None, None));

        assert_eq!(stats.total_records, 4);
        assert_eq!(stats.with_real_year, 1);
        assert_eq!(stats.with_estimated_year, 2);
        assert_eq!(stats.without_year, 1);
        assert_eq!(stats.rejected_raw_year, 1);
        assert_eq!(stats.missing_airline, 4);
        assert_eq!(stats.year_coverage_pct(), Some(75.0));
        assert_eq!(stats.by_category.get("Other"), Some(&4));
        assert_eq!(stats.by_oem.get("none"), Some(&4));
    }

    #[test]
    fn test_merge_adds_counts() {
        let mut a = DatasetStats::default();
        a.observe(&rec(Some("2012"), Some(2012), Some(2012)));
        let mut b = DatasetStats::default();
        b.observe(&rec(None, None, None));
        b.observe(&rec(None, None, None));

        a.merge(b);
        assert_eq!(a.total_records, 3);
        assert_eq!(a.without_year, 2);
        assert_eq!(a.by_category.get("Other"), Some(&3));
    }

    // Helper functions for tests
    fn rec(raw: Option<&str>, real: Option<i32>, used: Option<i32>) -> ResolvedRecord {
        ResolvedRecord {
            source: FleetRecord {
                entry_year: raw.map(str::to_string),
                ..Default::default()
            },
            year: ResolvedYear {
                entry_year_real: real,
                entry_year_est: used.filter(|_| real.is_none()),
                entry_year_used: used,
            },
            aircraft_category: AircraftCategory::Other,
            oem: None,
        }
    }
}
