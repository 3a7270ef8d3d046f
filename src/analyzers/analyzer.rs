use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::analyzers::aggregate::ViewAccumulator;
use crate::analyzers::score::{ScoringPolicy, score_table};
use crate::analyzers::types::{AIRLINE_VIEW, Report, ViewSpec};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::record::{Engine, FleetRecord};
use crate::stats::DatasetStats;

/// Derivation engine plus the views and scoring policy of a run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    engine: Engine,
    views: Vec<ViewSpec>,
    thresholds: Vec<i32>,
    policy: ScoringPolicy,
    score_view: Option<String>,
}

impl Pipeline {
    pub fn new(
        engine: Engine,
        views: Vec<ViewSpec>,
        thresholds: Vec<i32>,
        policy: ScoringPolicy,
    ) -> Self {
        let score_view = views
            .iter()
            .any(|v| v.name == AIRLINE_VIEW)
            .then(|| AIRLINE_VIEW.to_string());

        Self {
            engine,
            views,
            thresholds,
            policy,
            score_view,
        }
    }

    pub fn from_config(engine: Engine, config: &ReportConfig) -> Self {
        Self::new(engine, config.views(), config.thresholds.clone(), config.policy())
    }

    pub fn shard(&self) -> Shard {
        Shard {
            stats: DatasetStats::default(),
            views: self
                .views
                .iter()
                .map(|spec| ViewAccumulator::new(spec.clone(), self.thresholds.clone()))
                .collect(),
        }
    }

    /// Derives and aggregates a batch of records into a fresh shard.
    pub fn process<I>(&self, records: I) -> Shard
    where
        I: IntoIterator<Item = FleetRecord>,
    {
        let mut shard = self.shard();
        for record in records {
            shard.push(&self.engine, record);
        }
        shard
    }

    /// Runs the whole pipeline over in-memory records.
    pub fn run<I>(&self, records: I) -> Report
    where
        I: IntoIterator<Item = FleetRecord>,
    {
        self.finish(self.process(records))
    }

    /// Streams records one at a time; memory stays bounded by group count.
    #[tracing::instrument(skip_all)]
    pub fn run_streaming<I>(&self, records: I) -> Result<Report>
    where
        I: IntoIterator<Item = Result<FleetRecord>>,
    {
        let mut shard = self.shard();
        for record in records {
            shard.push(&self.engine, record?);
        }
        Ok(self.finish(shard))
    }

    /// Turns merged accumulators into the report tables and scores.
    pub fn finish(&self, shard: Shard) -> Report {
        let Shard { stats, views } = shard;

        log_data_quality(&stats);

        let tables: Vec<_> = views.into_iter().map(ViewAccumulator::finish).collect();
        let scores = self
            .score_view
            .as_deref()
            .and_then(|name| tables.iter().find(|t| t.spec.name == name))
            .map(|airlines| score_table(airlines, &self.policy));

        if let Some(scores) = &scores {
            info!(
                scored = scores.rows.len(),
                min_sample = scores.min_sample,
                "Airlines scored"
            );
        }

        Report {
            summary: stats,
            tables,
            scores,
        }
    }
}

/// Partial results for a subset of records. Shards merge in any order.
#[derive(Debug, Clone, PartialEq)]
pub struct Shard {
    stats: DatasetStats,
    views: Vec<ViewAccumulator>,
}

impl Shard {
    pub fn push(&mut self, engine: &Engine, record: FleetRecord) {
        let resolved = engine.derive(record);
        self.stats.observe(&resolved);
        for view in &mut self.views {
            view.push(&resolved);
        }
    }

    pub fn merge(&mut self, other: Shard) {
        self.stats.merge(other.stats);
        for (view, other) in self.views.iter_mut().zip(other.views) {
            view.merge(other);
        }
    }

    pub fn records(&self) -> u64 {
        self.stats.total_records
    }
}

/// Chunked parallel run: each chunk of `chunk_size` records is derived and
/// aggregated on a blocking task, with at most `concurrency` chunks in flight,
/// and the shards are merged as they complete.
#[tracing::instrument(skip(pipeline, records))]
pub async fn run_parallel<I>(
    pipeline: Arc<Pipeline>,
    records: I,
    chunk_size: usize,
    concurrency: usize,
) -> anyhow::Result<Report>
where
    I: IntoIterator<Item = Result<FleetRecord>>,
{
    let chunk_size = chunk_size.max(1);
    let concurrency = concurrency.max(1);

    let mut merged = pipeline.shard();
    let mut tasks: JoinSet<Shard> = JoinSet::new();
    let mut records = records.into_iter();
    let mut chunks = 0usize;

    loop {
        let mut chunk = Vec::with_capacity(chunk_size);
        for record in records.by_ref().take(chunk_size) {
            chunk.push(record?);
        }
        if chunk.is_empty() {
            break;
        }

        chunks += 1;
        debug!(chunk = chunks, records = chunk.len(), "Dispatching chunk");

        let pipeline = pipeline.clone();
        tasks.spawn_blocking(move || pipeline.process(chunk));

        while tasks.len() >= concurrency {
            if let Some(shard) = tasks.join_next().await {
                merged.merge(shard?);
            }
        }
    }

    while let Some(shard) = tasks.join_next().await {
        merged.merge(shard?);
    }

    info!(chunks, records = merged.records(), "All chunks aggregated");
    Ok(pipeline.finish(merged))
}

fn log_data_quality(stats: &DatasetStats) {
    if stats.missing_airline > 0 {
        warn!(
            rows = stats.missing_airline,
            "Rows without airline_name; kept but left out of the airline view"
        );
    }
    if stats.rejected_raw_year > 0 {
        warn!(
            rows = stats.rejected_raw_year,
            "Rows with an invalid entry_year; estimate used where available"
        );
    }

    info!(
        total = stats.total_records,
        real_year = stats.with_real_year,
        estimated_year = stats.with_estimated_year,
        without_year = stats.without_year,
        coverage_pct = stats.year_coverage_pct(),
        "Dataset resolved"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::FleetReader;
    use crate::year::YearBounds;
    use chrono::NaiveDate;

    fn pipeline() -> Pipeline {
        let date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let engine = Engine::builtin(YearBounds::for_date(date));
        Pipeline::from_config(engine, &ReportConfig::default())
    }

    fn record(
        airline: &str,
        region: &str,
        model: &str,
        manufacturer: &str,
        year: &str,
    ) -> FleetRecord {
        FleetRecord {
            airline_name: Some(airline.into()),
            region: Some(region.into()),
            model_key: Some(model.into()),
            manufacturer: Some(manufacturer.into()),
            entry_year: Some(year.into()),
            ..Default::default()
        }
    }

    fn fleet() -> Vec<FleetRecord> {
        let mut records = Vec::new();
        for i in 0..12 {
            let year = if i < 6 { "2018" } else { "2008" };
            records.push(record("Acme", "Europe", "A20N", "Airbus SAS", year));
        }
        for _ in 0..4 {
            records.push(record("Tiny", "Asia", "AT76", "ATR", ""));
        }
        records.push(record("Tiny", "Asia", "C172", "Cessna", "1979"));
        records
    }

    #[test]
    fn test_run_produces_all_tables() {
        let report = pipeline().run(fleet());

        let names: Vec<_> = report.tables.iter().map(|t| t.spec.name.as_str()).collect();
        assert_eq!(names, vec!["by_airline", "by_region", "by_category", "by_oem"]);
        assert_eq!(report.summary.total_records, 17);
        assert_eq!(report.summary.with_estimated_year, 4);
    }

    #[test]
    fn test_scores_filter_small_airlines() {
        let report = pipeline().run(fleet());
        let scores = report.scores.unwrap();

        assert_eq!(scores.rows.len(), 1);
        assert_eq!(scores.rows[0].row.label(0), Some("Acme"));
        // 50% >= 2015, 50% >= 2010
        assert_eq!(scores.rows[0].modernity_score, Some(75.0));
    }

    #[test]
    fn test_category_view_uses_real_years_only() {
        let report = pipeline().run(fleet());
        let categories = report.table("by_category").unwrap();

        assert!(categories.find(&["Commercial Turboprop"]).is_none());
        assert_eq!(categories.find(&["Commercial Jet"]).unwrap().aircraft_count, 12);
        assert_eq!(categories.find(&["General Aviation"]).unwrap().aircraft_count, 1);

        let oems = report.table("by_oem").unwrap();
        let atr = oems.find(&["ATR"]).unwrap();
        assert_eq!(atr.aircraft_count, 4);
        assert_eq!(atr.pct_modern(2010), Some(100.0));
        assert!(oems.find(&["none"]).is_none());
    }

    #[test]
    fn test_run_is_idempotent() {
        let p = pipeline();
        assert_eq!(p.run(fleet()), p.run(fleet()));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let p = pipeline();
        let mut reversed = fleet();
        reversed.reverse();
        assert_eq!(p.run(fleet()), p.run(reversed));
    }

    #[test]
    fn test_streaming_propagates_errors() {
        let records = vec![
            Ok(FleetRecord::default()),
            Err(crate::error::FleetError::InvalidConfig("boom".into())),
        ];
        assert!(pipeline().run_streaming(records).is_err());
    }

    #[test]
    fn test_streaming_keeps_rows_with_invalid_utf8() {
        let csv: &'static [u8] = b"airline_name,manufacturer,model_key,entry_year\n\
                                  Acme,Airbus,A20N,2018\n\
                                  Acme,ATR Avions de Transport R\xe9gional,AT76,2012\n";
        let reader = FleetReader::new(Box::new(csv)).unwrap();

        let report = pipeline().run_streaming(reader.records()).unwrap();
        assert_eq!(report.summary.total_records, 2);

        let oems = report.table("by_oem").unwrap();
        assert_eq!(oems.find(&["Airbus"]).unwrap().aircraft_count, 1);
        assert_eq!(oems.find(&["ATR"]).unwrap().aircraft_count, 1);
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        let p = Arc::new(pipeline());
        let sequential = p.run(fleet());

        let records = fleet().into_iter().map(Ok);
        let parallel = run_parallel(p.clone(), records, 3, 2).await.unwrap();

        assert_eq!(parallel, sequential);
    }
}
