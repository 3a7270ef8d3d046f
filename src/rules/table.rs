//! Loading externally supplied estimator tables.
//!
//! The file is a CSV with a `match,pattern,year` header; `#` starts a comment
//! line. `match` is one of `prefix`, `exact` or `contains` and may be left
//! empty for `prefix`. Row order is evaluation order.
//!
//! ```text
//! match,pattern,year
//! prefix,A20N,2016
//! ,Airbus A32,1988
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{FleetError, Result};
use crate::rules::{Field, Pattern, Rule, RuleSet};

#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(rename = "match", default)]
    kind: Option<String>,
    pattern: String,
    year: String,
}

/// Reads a `model_key -> year` rule table from `path`.
pub fn load_year_table(path: &Path) -> Result<RuleSet<i32>> {
    let file = File::open(path).map_err(|source| FleetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let rules = parse_year_table(file)?;

    debug!(path = %path.display(), rules = rules.len(), "Estimator table loaded");
    for s in rules.shadowed() {
        warn!(
            earlier = s.earlier,
            later = s.later,
            pattern = %rules.rules()[s.later].pattern.describe(),
            "Estimator rule is unreachable; review table order"
        );
    }

    Ok(rules)
}

pub fn parse_year_table<R: Read>(reader: R) -> Result<RuleSet<i32>> {
    let mut rdr = ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut rules = RuleSet::default();
    let mut record = StringRecord::new();

    while rdr.read_record(&mut record)? {
        let line = record.position().map_or(0, |p| p.line());
        let row: TableRow = record.deserialize(Some(&headers))?;
        rules.push(to_rule(row, line)?);
    }

    Ok(rules)
}

fn to_rule(row: TableRow, line: u64) -> Result<Rule<i32>> {
    if row.pattern.is_empty() {
        return Err(FleetError::InvalidRule {
            line,
            reason: "empty pattern".into(),
        });
    }

    let year: i32 = row.year.parse().map_err(|_| FleetError::InvalidRule {
        line,
        reason: format!("year {:?} is not an integer", row.year),
    })?;

    let pattern = match row.kind.as_deref().unwrap_or("") {
        "" | "prefix" => Pattern::Prefix(row.pattern),
        "exact" => Pattern::Exact(row.pattern),
        "contains" => Pattern::Contains(row.pattern),
        other => {
            return Err(FleetError::InvalidRule {
                line,
                reason: format!("unknown match kind {other:?}"),
            });
        }
    };

    Ok(Rule::new(Field::ModelKey, pattern, year))
}
