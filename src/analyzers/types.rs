//! Data types used by the aggregation pipeline.

use serde::{Deserialize, Serialize};

use crate::classify::Oem;
use crate::record::{ResolvedRecord, non_blank};
use crate::stats::DatasetStats;

/// A grouping column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    #[serde(alias = "airline_name")]
    Airline,
    Country,
    Region,
    #[serde(alias = "aircraft_category")]
    Category,
    Oem,
}

impl Dimension {
    /// Output column name.
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::Airline => "airline_name",
            Dimension::Country => "country",
            Dimension::Region => "region",
            Dimension::Category => "aircraft_category",
            Dimension::Oem => "oem",
        }
    }

    /// The record's label for this dimension. Blank text and untracked OEMs
    /// are unlabeled (`None`).
    pub fn value(&self, rec: &ResolvedRecord) -> Option<String> {
        let text = match self {
            Dimension::Airline => rec.source.airline_name.as_deref(),
            Dimension::Country => rec.source.country.as_deref(),
            Dimension::Region => rec.source.region.as_deref(),
            Dimension::Category => return Some(rec.aircraft_category.label().to_string()),
            Dimension::Oem => return rec.oem.as_ref().map(Oem::label).map(str::to_string),
        };
        non_blank(text).map(str::to_string)
    }
}

/// Which derived year a view aggregates over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearBasis {
    /// Validated raw year only; estimates are ignored.
    Real,
    /// Real year, else estimate.
    #[default]
    Resolved,
}

impl YearBasis {
    pub fn year(&self, rec: &ResolvedRecord) -> Option<i32> {
        match self {
            YearBasis::Real => rec.year.entry_year_real,
            YearBasis::Resolved => rec.year.entry_year_used,
        }
    }
}

/// Definition of one aggregate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSpec {
    pub name: String,
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub year_basis: YearBasis,
    /// Leave records without a year on the view's basis out of the group
    /// entirely, including `aircraft_count_total`.
    #[serde(default)]
    pub known_year_only: bool,
    /// Drop groups where any key label is missing.
    #[serde(default)]
    pub skip_unlabeled: bool,
}

impl ViewSpec {
    pub fn new(name: impl Into<String>, dimensions: Vec<Dimension>) -> Self {
        Self {
            name: name.into(),
            dimensions,
            year_basis: YearBasis::Resolved,
            known_year_only: false,
            skip_unlabeled: false,
        }
    }

    pub fn with_year_basis(mut self, basis: YearBasis) -> Self {
        self.year_basis = basis;
        self
    }

    pub fn known_year_only(mut self) -> Self {
        self.known_year_only = true;
        self
    }

    pub fn skip_unlabeled(mut self) -> Self {
        self.skip_unlabeled = true;
        self
    }

    /// The four tables of the standard report.
    ///
    /// The category view counts validated years only; the OEM view uses
    /// resolved years and drops untracked manufacturers.
    pub fn standard() -> Vec<ViewSpec> {
        vec![
            ViewSpec::new(AIRLINE_VIEW, vec![Dimension::Airline]).skip_unlabeled(),
            ViewSpec::new("by_region", vec![Dimension::Region]).skip_unlabeled(),
            ViewSpec::new("by_category", vec![Dimension::Category])
                .with_year_basis(YearBasis::Real)
                .known_year_only()
                .skip_unlabeled(),
            ViewSpec::new("by_oem", vec![Dimension::Oem]).skip_unlabeled(),
        ]
    }
}

/// Name of the standard airline view, the input of the scorer.
pub const AIRLINE_VIEW: &str = "by_airline";

pub type GroupKey = Vec<Option<String>>;

/// Count and share of known-year records at or after a threshold year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModernShare {
    pub threshold: i32,
    pub count: u64,
    /// `None` when the group has no known-year record.
    pub pct: Option<f64>,
}

/// One group of an aggregate table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: GroupKey,
    pub aircraft_count_total: u64,
    /// Records with a known year; the denominator of every percentage.
    pub aircraft_count: u64,
    pub coverage_pct: Option<f64>,
    pub avg_entry_year: Option<f64>,
    pub distinct_types: u64,
    pub modern: Vec<ModernShare>,
}

impl AggregateRow {
    pub fn modern_share(&self, threshold: i32) -> Option<&ModernShare> {
        self.modern.iter().find(|m| m.threshold == threshold)
    }

    pub fn pct_modern(&self, threshold: i32) -> Option<f64> {
        self.modern_share(threshold).and_then(|m| m.pct)
    }

    pub fn label(&self, idx: usize) -> Option<&str> {
        self.key.get(idx).and_then(|k| k.as_deref())
    }
}

/// A finished aggregate table, rows sorted by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewTable {
    pub spec: ViewSpec,
    pub thresholds: Vec<i32>,
    pub rows: Vec<AggregateRow>,
}

impl ViewTable {
    /// Looks up a row by its labels.
    pub fn find(&self, labels: &[&str]) -> Option<&AggregateRow> {
        self.rows.iter().find(|row| {
            row.key.len() == labels.len()
                && row
                    .key
                    .iter()
                    .zip(labels)
                    .all(|(k, l)| k.as_deref() == Some(*l))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRow {
    #[serde(flatten)]
    pub row: AggregateRow,
    pub modernity_score: Option<f64>,
    pub modernity_index: Option<f64>,
}

/// Scorer output: filtered airline rows, best score first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreTable {
    pub dimensions: Vec<Dimension>,
    pub thresholds: Vec<i32>,
    pub min_sample: u64,
    pub rows: Vec<ScoredRow>,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: DatasetStats,
    pub tables: Vec<ViewTable>,
    pub scores: Option<ScoreTable>,
}

impl Report {
    pub fn table(&self, name: &str) -> Option<&ViewTable> {
        self.tables.iter().find(|t| t.spec.name == name)
    }
}
