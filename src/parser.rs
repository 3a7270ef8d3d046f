//! CSV ingestion of the enriched fleet dataset.
//!
//! Files ending in `.gz` are decompressed on the fly. Only the columns in
//! [`REQUIRED_COLUMNS`] must be present; every other column defaults to null.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use flate2::read::GzDecoder;
use tracing::{debug, warn};

use crate::error::{FleetError, Result};
use crate::record::FleetRecord;

pub const REQUIRED_COLUMNS: &[&str] = &["airline_name", "entry_year"];

/// A validated CSV reader over fleet records.
pub struct FleetReader {
    inner: csv::Reader<Box<dyn Read>>,
    headers: StringRecord,
}

impl FleetReader {
    /// Wraps `reader` and checks the header for the required columns.
    pub fn new(reader: Box<dyn Read>) -> Result<Self> {
        let mut inner = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = lossy_record(inner.byte_headers()?);
        let available: Vec<String> = headers.iter().map(str::to_string).collect();
        require_columns(&available)?;

        Ok(Self { inner, headers })
    }

    pub fn records(self) -> FleetRecords {
        FleetRecords {
            inner: self.inner,
            headers: self.headers,
            raw: ByteRecord::new(),
        }
    }
}

/// Iterator over parsed records. A malformed CSV line yields an error; the
/// caller decides whether to stop.
///
/// Cells are decoded leniently: invalid UTF-8 bytes become U+FFFD instead of
/// failing the row.
pub struct FleetRecords {
    inner: csv::Reader<Box<dyn Read>>,
    headers: StringRecord,
    raw: ByteRecord,
}

impl FleetRecords {
    fn read_next(&mut self) -> Result<Option<FleetRecord>> {
        if !self.inner.read_byte_record(&mut self.raw)? {
            return Ok(None);
        }

        let record = lossy_record(&self.raw);
        if record.as_byte_record() != &self.raw {
            let line = self.raw.position().map_or(0, |p| p.line());
            warn!(line, "Replaced invalid UTF-8 in fleet row");
        }

        Ok(Some(record.deserialize(Some(&self.headers))?))
    }
}

impl Iterator for FleetRecords {
    type Item = Result<FleetRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

fn lossy_record(raw: &ByteRecord) -> StringRecord {
    raw.iter().map(String::from_utf8_lossy).collect()
}

/// Opens a fleet CSV, plain or gzip-compressed.
pub fn open_fleet(path: &Path) -> Result<FleetReader> {
    let file = File::open(path).map_err(|source| FleetError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let gzip = path.extension().and_then(|e| e.to_str()) == Some("gz");
    debug!(path = %path.display(), gzip, "Opening fleet dataset");

    let reader: Box<dyn Read> = if gzip {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    FleetReader::new(reader)
}

/// Reads every record of a fleet CSV into memory.
pub fn read_fleet(path: &Path) -> Result<Vec<FleetRecord>> {
    open_fleet(path)?.records().collect()
}

fn require_columns(available: &[String]) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !available.iter().any(|a| a == *c))
        .map(|c| c.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FleetError::MissingColumns {
            missing,
            available: available.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::env;
    use std::fs;
    use std::io::Write;

    fn parse(csv: &'static str) -> Result<Vec<FleetRecord>> {
        FleetReader::new(Box::new(csv.as_bytes()))?.records().collect()
    }

    #[test]
    fn test_parse_minimal_columns() {
        let records = parse("airline_name,entry_year\nAcme,2015\nZephyr,\n").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].airline_name.as_deref(), Some("Acme"));
        assert_eq!(records[0].entry_year.as_deref(), Some("2015"));
        assert_eq!(records[1].entry_year, None);
        assert_eq!(records[1].model_key, None);
    }

    #[test]
    fn test_parse_missing_required_column() {
        let err = parse("airline,entry_year\nAcme,2015\n").unwrap_err();

        match err {
            FleetError::MissingColumns { missing, available } => {
                assert_eq!(missing, vec!["airline_name".to_string()]);
                assert_eq!(available, vec!["airline".to_string(), "entry_year".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_lenient_numbers_and_extra_columns() {
        let csv = "airline_name,entry_year,total_fleet_size,model_key,source\n\
                   Acme, 2015.0 ,n/a, A20N ,fr24\n\
                   Acme,2010,12,B738,fr24\n";
        let records = parse(csv).unwrap();

        assert_eq!(records[0].total_fleet_size, None);
        assert_eq!(records[0].entry_year.as_deref(), Some("2015.0"));
        assert_eq!(records[0].model_key.as_deref(), Some("A20N"));
        assert_eq!(records[1].total_fleet_size, Some(12.0));
    }

    #[test]
    fn test_invalid_utf8_cell_keeps_the_row() {
        let csv: &'static [u8] = b"airline_name,manufacturer,model_key,entry_year\n\
                                  Acme,Airbus,A20N,2018\n\
                                  Acme,ATR Avions de Transport R\xe9gional,AT76,2012\n";
        let records: Vec<FleetRecord> = FleetReader::new(Box::new(csv))
            .unwrap()
            .records()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].model_key.as_deref(), Some("A20N"));
        assert_eq!(
            records[1].manufacturer.as_deref(),
            Some("ATR Avions de Transport R\u{FFFD}gional")
        );
        assert_eq!(records[1].entry_year.as_deref(), Some("2012"));
    }

    #[test]
    fn test_open_gzip_file() {
        let path = env::temp_dir().join("fleet_modernity_test_parser.csv.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(b"airline_name,entry_year,model_key\nAcme,2019,A21N\n")
            .unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        let records = read_fleet(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].model_key.as_deref(), Some("A21N"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_open_missing_file() {
        let err = open_fleet(Path::new("/nonexistent/fleet.csv")).err().unwrap();
        assert!(matches!(err, FleetError::Open { .. }));
    }
}
