//! Output formatting and persistence for report tables.
//!
//! Tables are flattened into named columns once, then written as CSV
//! (optionally gzip-compressed) or JSON. Nulls become empty CSV cells and
//! JSON `null`; ratios are written with two decimals.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::analyzers::types::{AggregateRow, Dimension, Report, ScoreTable, ViewTable};
use crate::classify::Oem;
use crate::error::Result;
use crate::record::ResolvedRecord;
use crate::stats::DatasetStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Csv,
    Json,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Int(i64),
    /// Published with two decimals.
    Ratio(f64),
    /// A `[0, 1]` fraction, published with four decimals.
    Fraction(f64),
}

impl Cell {
    fn text(value: Option<&str>) -> Self {
        value.map_or(Cell::Null, |s| Cell::Text(s.to_string()))
    }

    fn int(value: Option<i64>) -> Self {
        value.map_or(Cell::Null, Cell::Int)
    }

    fn ratio(value: Option<f64>) -> Self {
        value.map_or(Cell::Null, Cell::Ratio)
    }

    fn count(value: u64) -> Self {
        Cell::Int(value as i64)
    }

    pub fn to_csv(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Int(i) => i.to_string(),
            Cell::Ratio(f) => format!("{f:.2}"),
            Cell::Fraction(f) => format!("{f:.4}"),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Cell::Null => Value::Null,
            Cell::Text(s) => Value::String(s.clone()),
            Cell::Int(i) => Value::from(*i),
            Cell::Ratio(f) | Cell::Fraction(f) => Value::from(*f),
        }
    }
}

/// A column-named, row-major table ready for writing.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

fn aggregate_columns(dimensions: &[Dimension], thresholds: &[i32]) -> Vec<String> {
    let mut columns: Vec<String> = dimensions.iter().map(|d| d.column().to_string()).collect();
    columns.extend(
        [
            "aircraft_count_total",
            "aircraft_count",
            "coverage_pct",
            "avg_entry_year",
            "distinct_types",
        ]
        .map(String::from),
    );
    for t in thresholds {
        columns.push(format!("modern_count_{t}"));
        columns.push(format!("pct_modern_{t}"));
    }
    columns
}

fn aggregate_cells(row: &AggregateRow) -> Vec<Cell> {
    let mut cells: Vec<Cell> = row.key.iter().map(|k| Cell::text(k.as_deref())).collect();
    cells.push(Cell::count(row.aircraft_count_total));
    cells.push(Cell::count(row.aircraft_count));
    cells.push(Cell::ratio(row.coverage_pct));
    cells.push(Cell::ratio(row.avg_entry_year));
    cells.push(Cell::count(row.distinct_types));
    for m in &row.modern {
        cells.push(Cell::count(m.count));
        cells.push(Cell::ratio(m.pct));
    }
    cells
}

pub fn view_table(view: &ViewTable) -> Table {
    Table {
        columns: aggregate_columns(&view.spec.dimensions, &view.thresholds),
        rows: view.rows.iter().map(aggregate_cells).collect(),
    }
}

pub fn score_table(scores: &ScoreTable) -> Table {
    let mut columns = aggregate_columns(&scores.dimensions, &scores.thresholds);
    columns.push("modernity_score".into());
    columns.push("modernity_index".into());

    let rows = scores
        .rows
        .iter()
        .map(|scored| {
            let mut cells = aggregate_cells(&scored.row);
            cells.push(Cell::ratio(scored.modernity_score));
            cells.push(scored.modernity_index.map_or(Cell::Null, Cell::Fraction));
            cells
        })
        .collect();

    Table { columns, rows }
}

pub const RESOLVED_COLUMNS: &[&str] = &[
    "airline_name",
    "country",
    "region",
    "aircraft_type",
    "registration",
    "total_fleet_size",
    "manufacturer",
    "model_key",
    "entry_year",
    "entry_year_real",
    "entry_year_est",
    "entry_year_used",
    "aircraft_category",
    "oem",
];

pub fn resolved_cells(rec: &ResolvedRecord) -> Vec<Cell> {
    let s = &rec.source;
    vec![
        Cell::text(s.airline_name.as_deref()),
        Cell::text(s.country.as_deref()),
        Cell::text(s.region.as_deref()),
        Cell::text(s.aircraft_type.as_deref()),
        Cell::text(s.registration.as_deref()),
        s.total_fleet_size
            .map_or(Cell::Null, |n| Cell::Text(n.to_string())),
        Cell::text(s.manufacturer.as_deref()),
        Cell::text(s.model_key.as_deref()),
        Cell::text(s.entry_year.as_deref()),
        Cell::int(rec.year.entry_year_real.map(i64::from)),
        Cell::int(rec.year.entry_year_est.map(i64::from)),
        Cell::int(rec.year.entry_year_used.map(i64::from)),
        Cell::Text(rec.aircraft_category.label().to_string()),
        Cell::Text(Oem::label_or_none(rec.oem).to_string()),
    ]
}

pub fn write_csv<W: Write>(writer: W, table: &Table) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(Cell::to_csv))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(writer: W, table: &Table) -> Result<()> {
    let rows: Vec<Value> = table
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = table
                .columns
                .iter()
                .cloned()
                .zip(row.iter().map(Cell::to_json))
                .collect();
            Value::Object(object)
        })
        .collect();

    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}

/// Writes `table` to `<dir>/<name>.<ext>[.gz]` and returns the path.
pub fn write_table(
    dir: &Path,
    name: &str,
    table: &Table,
    format: Format,
    gzip: bool,
) -> Result<PathBuf> {
    let mut file_name = format!("{name}.{}", format.extension());
    if gzip {
        file_name.push_str(".gz");
    }
    let path = dir.join(file_name);
    debug!(path = %path.display(), rows = table.rows.len(), "Writing table");

    let file = BufWriter::new(File::create(&path)?);
    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_format(&mut encoder, table, format)?;
        encoder.finish()?.flush()?;
    } else {
        let mut file = file;
        write_format(&mut file, table, format)?;
        file.flush()?;
    }

    Ok(path)
}

fn write_format<W: Write>(writer: &mut W, table: &Table, format: Format) -> Result<()> {
    match format {
        Format::Csv => write_csv(writer, table),
        Format::Json => write_json(writer, table),
    }
}

/// Writes every report table plus `summary.json` into `dir`.
pub fn write_report(
    dir: &Path,
    report: &Report,
    format: Format,
    gzip: bool,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for view in &report.tables {
        written.push(write_table(dir, &view.spec.name, &view_table(view), format, gzip)?);
    }
    if let Some(scores) = &report.scores {
        written.push(write_table(dir, "airline_scores", &score_table(scores), format, gzip)?);
    }
    written.push(write_summary(dir, &report.summary)?);

    info!(dir = %dir.display(), files = written.len(), "Report written");
    Ok(written)
}

pub fn write_summary(dir: &Path, summary: &DatasetStats) -> Result<PathBuf> {
    let path = dir.join("summary.json");
    let file = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(file, summary)?;
    Ok(path)
}
