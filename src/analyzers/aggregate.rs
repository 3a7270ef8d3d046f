use std::collections::{BTreeMap, BTreeSet};

use crate::analyzers::types::{AggregateRow, GroupKey, ModernShare, ViewSpec, ViewTable};
use crate::analyzers::utility::{mean, pct};
use crate::record::ResolvedRecord;

/// Running totals for one group. Every field is a sum, count or set, so
/// accumulators merge in any order to the same result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupAccumulator {
    total: u64,
    with_year: u64,
    year_sum: i64,
    modern: Vec<u64>,
    types: BTreeSet<String>,
}

impl GroupAccumulator {
    fn new(thresholds: usize) -> Self {
        Self {
            modern: vec![0; thresholds],
            ..Default::default()
        }
    }

    fn add(&mut self, year: Option<i32>, type_key: Option<&str>, thresholds: &[i32]) {
        self.total += 1;

        if let Some(year) = year {
            self.with_year += 1;
            self.year_sum += i64::from(year);

            for (count, threshold) in self.modern.iter_mut().zip(thresholds) {
                if year >= *threshold {
                    *count += 1;
                }
            }

            // Diversity counts the aircraft behind the statistics.
            if let Some(t) = type_key {
                if !self.types.contains(t) {
                    self.types.insert(t.to_string());
                }
            }
        }
    }

    fn merge(&mut self, other: GroupAccumulator) {
        self.total += other.total;
        self.with_year += other.with_year;
        self.year_sum += other.year_sum;
        for (a, b) in self.modern.iter_mut().zip(other.modern) {
            *a += b;
        }
        self.types.extend(other.types);
    }

    fn finish(self, key: GroupKey, thresholds: &[i32]) -> AggregateRow {
        let modern = thresholds
            .iter()
            .zip(&self.modern)
            .map(|(&threshold, &count)| ModernShare {
                threshold,
                count,
                pct: pct(count, self.with_year),
            })
            .collect();

        AggregateRow {
            key,
            aircraft_count_total: self.total,
            aircraft_count: self.with_year,
            coverage_pct: pct(self.with_year, self.total),
            avg_entry_year: mean(self.year_sum, self.with_year),
            distinct_types: self.types.len() as u64,
            modern,
        }
    }
}

/// Partition-then-reduce state for one view. Memory is bounded by the number
/// of distinct groups, not by the number of records pushed.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewAccumulator {
    spec: ViewSpec,
    thresholds: Vec<i32>,
    groups: BTreeMap<GroupKey, GroupAccumulator>,
}

impl ViewAccumulator {
    pub fn new(spec: ViewSpec, thresholds: Vec<i32>) -> Self {
        Self {
            spec,
            thresholds,
            groups: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, rec: &ResolvedRecord) {
        let year = self.spec.year_basis.year(rec);
        if self.spec.known_year_only && year.is_none() {
            return;
        }

        let key: GroupKey = self.spec.dimensions.iter().map(|d| d.value(rec)).collect();
        if self.spec.skip_unlabeled && key.iter().any(Option::is_none) {
            return;
        }

        let n = self.thresholds.len();
        self.groups
            .entry(key)
            .or_insert_with(|| GroupAccumulator::new(n))
            .add(year, rec.type_key(), &self.thresholds);
    }

    /// Folds another shard of the same view into this one.
    pub fn merge(&mut self, other: ViewAccumulator) {
        debug_assert_eq!(self.spec, other.spec);
        debug_assert_eq!(self.thresholds, other.thresholds);

        for (key, acc) in other.groups {
            match self.groups.get_mut(&key) {
                Some(existing) => existing.merge(acc),
                None => {
                    self.groups.insert(key, acc);
                }
            }
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn finish(self) -> ViewTable {
        let thresholds = self.thresholds;
        let rows = self
            .groups
            .into_iter()
            .map(|(key, acc)| acc.finish(key, &thresholds))
            .collect();

        ViewTable {
            spec: self.spec,
            thresholds,
            rows,
        }
    }
}

/// Aggregates records into a single view.
pub fn aggregate<'a, I>(records: I, spec: &ViewSpec, thresholds: &[i32]) -> ViewTable
where
    I: IntoIterator<Item = &'a ResolvedRecord>,
{
    let mut acc = ViewAccumulator::new(spec.clone(), thresholds.to_vec());
    for rec in records {
        acc.push(rec);
    }
    acc.finish()
}
