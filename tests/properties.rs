//! Property tests for year derivation and aggregation.

use chrono::NaiveDate;
use proptest::prelude::*;

use fleet_modernity::analyzers::analyzer::Pipeline;
use fleet_modernity::config::ReportConfig;
use fleet_modernity::record::{Engine, FleetRecord};
use fleet_modernity::year::{YearBounds, YearEstimator, YearResolver};

fn bounds() -> YearBounds {
    YearBounds::for_date(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
}

fn raw_year() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        (1800i32..2100).prop_map(|y| Some(y.to_string())),
        (1800i32..2100).prop_map(|y| Some(format!("{y}.0"))),
        "[A-Za-z0-9 .-]{0,6}".prop_map(Some),
    ]
}

fn model_key() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        prop::sample::select(vec!["A20N", "B738", "E190", "AT76", "C172", "B77W", "ZZZZ", ""])
            .prop_map(|s| Some(s.to_string())),
        "[A-Z0-9]{1,5}".prop_map(Some),
    ]
}

fn record() -> impl Strategy<Value = FleetRecord> {
    (
        prop::option::of(prop::sample::select(vec!["Alpha", "Beta", "Gamma", " "])),
        prop::option::of(prop::sample::select(vec!["Europe", "Asia"])),
        prop::option::of(prop::sample::select(vec!["Airbus", "Boeing", "ATR", "Cessna"])),
        model_key(),
        raw_year(),
    )
        .prop_map(|(airline, region, manufacturer, model_key, entry_year)| FleetRecord {
            airline_name: airline.map(str::to_string),
            region: region.map(str::to_string),
            manufacturer: manufacturer.map(str::to_string),
            model_key,
            entry_year,
            ..Default::default()
        })
}

proptest! {
    #[test]
    fn normalizer_accepts_exactly_in_bound_integers(year in 1700i32..2300) {
        let bounds = bounds();
        let normalized = bounds.normalize(Some(&year.to_string()));

        prop_assert_eq!(normalized.is_some(), (1900..=2024).contains(&year));
        if let Some(y) = normalized {
            prop_assert_eq!(y, year);
        }
    }

    #[test]
    fn resolved_year_stays_in_bounds(raw in raw_year(), key in model_key()) {
        let resolver = YearResolver::new(bounds(), YearEstimator::builtin());
        let resolved = resolver.resolve(raw.as_deref(), key.as_deref());

        if let Some(y) = resolved.entry_year_used {
            prop_assert!((1900..=2024).contains(&y));
        }
        if resolved.entry_year_real.is_some() {
            prop_assert_eq!(resolved.entry_year_used, resolved.entry_year_real);
        } else {
            prop_assert_eq!(resolved.entry_year_used, resolved.entry_year_est);
        }
    }

    #[test]
    fn aggregation_ignores_input_order(
        records in prop::collection::vec(record(), 0..60),
        seed in any::<u64>(),
    ) {
        let pipeline = Pipeline::from_config(Engine::builtin(bounds()), &ReportConfig::default());

        let mut shuffled = records.clone();
        // Deterministic rotation plus reversal stands in for a shuffle.
        if !shuffled.is_empty() {
            let mid = (seed as usize) % shuffled.len();
            shuffled.rotate_left(mid);
            shuffled.reverse();
        }

        prop_assert_eq!(pipeline.run(records), pipeline.run(shuffled));
    }

    #[test]
    fn percentages_stay_in_range(records in prop::collection::vec(record(), 1..60)) {
        let pipeline = Pipeline::from_config(Engine::builtin(bounds()), &ReportConfig::default());
        let report = pipeline.run(records);

        for table in &report.tables {
            for row in &table.rows {
                prop_assert!(row.aircraft_count <= row.aircraft_count_total);
                for share in &row.modern {
                    prop_assert!(share.count <= row.aircraft_count);
                    if let Some(pct) = share.pct {
                        prop_assert!((0.0..=100.0).contains(&pct));
                    }
                }
            }
        }
    }
}
