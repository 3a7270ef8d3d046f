//! Fleet records and their per-record derivation.

use serde::{Deserialize, Deserializer, Serialize};

use crate::classify::{AircraftCategory, CategoryClassifier, Oem, OemNormalizer};
use crate::year::{ResolvedYear, YearBounds, YearEstimator, YearResolver};

/// One row of the enriched fleet dataset. Every column is nullable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetRecord {
    pub airline_name: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub aircraft_type: Option<String>,
    pub registration: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_fleet_size: Option<f64>,
    pub manufacturer: Option<String>,
    pub model_key: Option<String>,
    /// Raw cell; validated by [`YearBounds::normalize`].
    pub entry_year: Option<String>,
}

/// Unparseable numbers become null instead of failing the row.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

impl FleetRecord {
    /// Rows without an airline cannot be attributed to the airline view.
    pub fn is_missing_airline(&self) -> bool {
        self.airline_name
            .as_deref()
            .is_none_or(|s| s.trim().is_empty())
    }
}

/// A fleet record plus every derived column.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRecord {
    pub source: FleetRecord,
    pub year: ResolvedYear,
    pub aircraft_category: AircraftCategory,
    pub oem: Option<Oem>,
}

impl ResolvedRecord {
    /// Distinct-type key: `aircraft_type`, else `model_key`.
    pub fn type_key(&self) -> Option<&str> {
        non_blank(self.source.aircraft_type.as_deref())
            .or_else(|| non_blank(self.source.model_key.as_deref()))
    }
}

pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// All static rule tables plus the reference-date bounds.
///
/// Derivation is a pure function of the record and the engine; the three
/// derivations do not depend on each other.
#[derive(Debug, Clone)]
pub struct Engine {
    resolver: YearResolver,
    classifier: CategoryClassifier,
    oem: OemNormalizer,
}

impl Engine {
    pub fn new(bounds: YearBounds, estimator: YearEstimator) -> Self {
        Self {
            resolver: YearResolver::new(bounds, estimator),
            classifier: CategoryClassifier::builtin(),
            oem: OemNormalizer::builtin(),
        }
    }

    pub fn builtin(bounds: YearBounds) -> Self {
        Self::new(bounds, YearEstimator::builtin())
    }

    pub fn bounds(&self) -> YearBounds {
        self.resolver.bounds()
    }

    pub fn resolver(&self) -> &YearResolver {
        &self.resolver
    }

    pub fn classifier(&self) -> &CategoryClassifier {
        &self.classifier
    }

    pub fn oem_normalizer(&self) -> &OemNormalizer {
        &self.oem
    }

    pub fn derive(&self, record: FleetRecord) -> ResolvedRecord {
        let model_key = record.model_key.as_deref();
        let manufacturer = record.manufacturer.as_deref();

        let year = self.resolver.resolve(record.entry_year.as_deref(), model_key);
        let aircraft_category = self.classifier.classify(model_key, manufacturer);
        let oem = self.oem.normalize(manufacturer);

        ResolvedRecord {
            source: record,
            year,
            aircraft_category,
            oem,
        }
    }
}
