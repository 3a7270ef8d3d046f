//! Composite modernity score for the airline table.
//!
//! `modernity_score = round(Σ weight × pct_modern_<threshold>, 2)` over the
//! configured weights. The default policy is
//!
//! | Threshold | Weight |
//! |-----------|--------|
//! | >= 2015   | 1.0    |
//! | >= 2010   | 0.5    |
//!
//! and only airlines with at least `min_sample` known-year aircraft are kept.
//!
//! Each kept row also carries `modernity_index`, the share of aircraft at or
//! after the index threshold (2015) as a ratio clamped to `[0, 1]`.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::analyzers::types::{AggregateRow, ScoreTable, ScoredRow, ViewTable};
use crate::analyzers::utility::round2;

pub const DEFAULT_MIN_SAMPLE: u64 = 10;
pub const DEFAULT_INDEX_THRESHOLD: i32 = 2015;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeight {
    pub threshold: i32,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub min_sample: u64,
    pub weights: Vec<ScoreWeight>,
    pub index_threshold: i32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            min_sample: DEFAULT_MIN_SAMPLE,
            weights: default_weights(),
            index_threshold: DEFAULT_INDEX_THRESHOLD,
        }
    }
}

pub fn default_weights() -> Vec<ScoreWeight> {
    vec![
        ScoreWeight {
            threshold: 2015,
            weight: 1.0,
        },
        ScoreWeight {
            threshold: 2010,
            weight: 0.5,
        },
    ]
}

impl ScoringPolicy {
    /// Weighted sum of the row's percentages, or `None` if any weighted
    /// percentage is unknown.
    pub fn score(&self, row: &AggregateRow) -> Option<f64> {
        let mut total = 0.0;
        for w in &self.weights {
            total += w.weight * row.pct_modern(w.threshold)?;
        }
        Some(round2(total))
    }

    /// `pct_modern_<index_threshold> / 100` clamped to `[0, 1]`; `None` when
    /// that percentage is unknown or not computed for the table.
    pub fn index(&self, row: &AggregateRow) -> Option<f64> {
        row.pct_modern(self.index_threshold)
            .map(|pct| (pct / 100.0).clamp(0.0, 1.0))
    }
}

/// Filters the airline table by sample size and attaches scores.
///
/// No re-aggregation happens here; rows are taken as computed.
pub fn score_table(table: &ViewTable, policy: &ScoringPolicy) -> ScoreTable {
    let mut rows: Vec<ScoredRow> = table
        .rows
        .iter()
        .filter(|row| row.aircraft_count >= policy.min_sample)
        .map(|row| ScoredRow {
            modernity_score: policy.score(row),
            modernity_index: policy.index(row),
            row: row.clone(),
        })
        .collect();

    rows.sort_by(|a, b| {
        by_score_desc(a.modernity_score, b.modernity_score)
            .then_with(|| a.row.key.cmp(&b.row.key))
    });

    ScoreTable {
        dimensions: table.spec.dimensions.clone(),
        thresholds: table.thresholds.clone(),
        min_sample: policy.min_sample,
        rows,
    }
}

// Unknown scores sort last.
fn by_score_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{Dimension, ModernShare, ViewSpec};

    #[test]
    fn test_score_formula() {
        let row = row("Acme", 50, 80.0, 90.0);
        assert_eq!(ScoringPolicy::default().score(&row), Some(125.0));
    }

    #[test]
    fn test_score_rounds_to_two_decimals() {
        let policy = ScoringPolicy {
            min_sample: 1,
            weights: vec![ScoreWeight {
                threshold: 2015,
                weight: 1.0 / 3.0,
            }],
            ..Default::default()
        };
        assert_eq!(policy.score(&row("Acme", 50, 50.0, 0.0)), Some(16.67));
    }

    #[test]
    fn test_small_airlines_excluded() {
        let table = table(vec![row("Tiny", 9, 100.0, 100.0), row("Big", 10, 10.0, 20.0)]);
        let scored = score_table(&table, &ScoringPolicy::default());

        assert_eq!(scored.rows.len(), 1);
        assert_eq!(scored.rows[0].row.label(0), Some("Big"));
        assert_eq!(scored.rows[0].modernity_score, Some(20.0));
        assert_eq!(scored.min_sample, 10);
    }

    #[test]
    fn test_sorted_by_score_then_name() {
        let table = table(vec![
            row("Alpha", 12, 10.0, 10.0),
            row("Bravo", 12, 60.0, 70.0),
            row("Charlie", 12, 10.0, 10.0),
        ]);
        let scored = score_table(&table, &ScoringPolicy::default());
        let names: Vec<_> = scored.rows.iter().map(|r| r.row.label(0).unwrap()).collect();

        assert_eq!(names, vec!["Bravo", "Alpha", "Charlie"]);
    }

    #[test]
    fn test_zero_min_sample_keeps_empty_groups_unscored() {
        let mut empty = row("Ghost", 0, 0.0, 0.0);
        for m in &mut empty.modern {
            m.pct = None;
        }
        let table = table(vec![empty, row("Acme", 3, 50.0, 50.0)]);
        let policy = ScoringPolicy {
            min_sample: 0,
            ..Default::default()
        };
        let scored = score_table(&table, &policy);

        assert_eq!(scored.rows.len(), 2);
        assert_eq!(scored.rows[1].modernity_score, None);
    }

    #[test]
    fn test_custom_weights() {
        let policy = ScoringPolicy {
            min_sample: 1,
            weights: vec![ScoreWeight {
                threshold: 2010,
                weight: 2.0,
            }],
            ..Default::default()
        };
        assert_eq!(policy.score(&row("Acme", 5, 40.0, 45.5)), Some(91.0));
    }

    #[test]
    fn test_index_is_share_of_2015_fleet() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.index(&row("Acme", 10, 50.0, 80.0)), Some(0.5));
        assert_eq!(policy.index(&row("Acme", 10, 0.0, 80.0)), Some(0.0));
        assert_eq!(policy.index(&row("Acme", 10, 100.0, 100.0)), Some(1.0));
    }

    #[test]
    fn test_index_is_clamped() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.index(&row("Over", 10, 120.0, 100.0)), Some(1.0));
        assert_eq!(policy.index(&row("Under", 10, -5.0, 0.0)), Some(0.0));
    }

    #[test]
    fn test_index_unknown_without_threshold() {
        let policy = ScoringPolicy {
            index_threshold: 2020,
            ..Default::default()
        };
        assert_eq!(policy.index(&row("Acme", 10, 50.0, 80.0)), None);

        let table = table(vec![row("Acme", 10, 37.5, 80.0)]);
        let scored = score_table(&table, &ScoringPolicy::default());
        assert_eq!(scored.rows[0].modernity_index, Some(0.375));
    }

    // Helper functions for tests
    fn row(airline: &str, count: u64, pct_2015: f64, pct_2010: f64) -> AggregateRow {
        AggregateRow {
            key: vec![Some(airline.to_string())],
            aircraft_count_total: count,
            aircraft_count: count,
            coverage_pct: Some(100.0),
            avg_entry_year: Some(2012.0),
            distinct_types: 1,
            modern: vec![
                ModernShare {
                    threshold: 2015,
                    count: 0,
                    pct: Some(pct_2015),
                },
                ModernShare {
                    threshold: 2010,
                    count: 0,
                    pct: Some(pct_2010),
                },
            ],
        }
    }

    fn table(rows: Vec<AggregateRow>) -> ViewTable {
        ViewTable {
            spec: ViewSpec::new("by_airline", vec![Dimension::Airline]),
            thresholds: vec![2015, 2010],
            rows,
        }
    }
}
