//! Report configuration.
//!
//! Stored as a JSON object on disk; every field is optional:
//! ```json
//! {
//!   "thresholds": [2015, 2010],
//!   "min_sample": 10,
//!   "score_weights": [
//!     { "threshold": 2015, "weight": 1.0 },
//!     { "threshold": 2010, "weight": 0.5 }
//!   ],
//!   "chunk_size": 50000,
//!   "concurrency": 4,
//!   "estimator_table": "data/ref/entry_years.csv",
//!   "extra_views": [
//!     { "name": "by_airline_region", "dimensions": ["airline", "region"] }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analyzers::score::{DEFAULT_MIN_SAMPLE, ScoreWeight, ScoringPolicy, default_weights};
use crate::analyzers::types::ViewSpec;
use crate::error::{FleetError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub thresholds: Vec<i32>,
    pub min_sample: u64,
    pub score_weights: Vec<ScoreWeight>,
    pub chunk_size: usize,
    pub concurrency: usize,
    pub estimator_table: Option<PathBuf>,
    pub extra_views: Vec<ViewSpec>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![2015, 2010],
            min_sample: DEFAULT_MIN_SAMPLE,
            score_weights: default_weights(),
            chunk_size: 50_000,
            concurrency: 4,
            estimator_table: None,
            extra_views: Vec::new(),
        }
    }
}

impl ReportConfig {
    /// Loads and validates the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| FleetError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ReportConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.thresholds.is_empty() {
            return Err(FleetError::InvalidConfig("thresholds must not be empty".into()));
        }
        if let Some(w) = self
            .score_weights
            .iter()
            .find(|w| !self.thresholds.contains(&w.threshold))
        {
            return Err(FleetError::InvalidConfig(format!(
                "score weight threshold {} is not in thresholds {:?}",
                w.threshold, self.thresholds
            )));
        }
        if self.chunk_size == 0 || self.concurrency == 0 {
            return Err(FleetError::InvalidConfig(
                "chunk_size and concurrency must be at least 1".into(),
            ));
        }
        if let Some(v) = self.extra_views.iter().find(|v| v.dimensions.is_empty()) {
            return Err(FleetError::InvalidConfig(format!(
                "view {:?} has no dimensions",
                v.name
            )));
        }
        Ok(())
    }

    pub fn policy(&self) -> ScoringPolicy {
        ScoringPolicy {
            min_sample: self.min_sample,
            weights: self.score_weights.clone(),
            ..Default::default()
        }
    }

    /// Standard report views followed by any configured extras.
    pub fn views(&self) -> Vec<ViewSpec> {
        let mut views = ViewSpec::standard();
        views.extend(self.extra_views.iter().cloned());
        views
    }
}
