//! Property tests for the feature pipeline over generated ledgers

use crate::{compute_features, FeatureRecord};
use chrono::{Datelike, Months, NaiveDate};
use ledger::RawLedgerRecord;
use proptest::prelude::*;
use std::collections::HashMap;

const DRUGS: [&str; 4] = ["Amlodipine 5mg", "Atenolol 50mg", "Metformin 500mg", "Losartan 50mg"];

/// Per-drug consumption series; `None` is an unrecorded month
fn series_strategy() -> impl Strategy<Value = Vec<Vec<Option<f64>>>> {
    let month = prop_oneof![
        1 => Just(None),
        6 => (0u32..2000).prop_map(|c| Some(f64::from(c))),
    ];
    prop::collection::vec(prop::collection::vec(month, 0..24), 1..=DRUGS.len())
}

fn month_date(offset: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 11, 1)
        .and_then(|d| d.checked_add_months(Months::new(offset as u32)))
        .unwrap()
}

fn build_ledger(series: &[Vec<Option<f64>>]) -> Vec<RawLedgerRecord> {
    series
        .iter()
        .enumerate()
        .flat_map(|(d, values)| {
            values.iter().enumerate().map(move |(m, c)| {
                RawLedgerRecord::new(month_date(m).format("%Y-%m-%d").to_string(), DRUGS[d], *c)
            })
        })
        .collect()
}

fn ledger_strategy() -> impl Strategy<Value = (Vec<Vec<Option<f64>>>, Vec<RawLedgerRecord>)> {
    series_strategy().prop_flat_map(|series| {
        let ledger = build_ledger(&series);
        (Just(series), Just(ledger).prop_shuffle())
    })
}

/// Offset of a record's month from the first generated month
fn month_offset(record: &FeatureRecord) -> usize {
    let date = record.ledger.date;
    ((date.year() - 2021) * 12 + date.month() as i32 - 11) as usize
}

fn reference_mean(values: &[Option<f64>], k: usize) -> Option<f64> {
    let window: Vec<f64> = values[k.saturating_sub(2)..=k].iter().flatten().copied().collect();
    if window.is_empty() {
        None
    } else {
        Some(window.iter().sum::<f64>() / window.len() as f64)
    }
}

proptest! {
    #[test]
    fn prop_calendar_and_completeness((_, ledger) in ledger_strategy()) {
        let table = compute_features(&ledger).unwrap();
        for record in &table.records {
            prop_assert!((1..=12).contains(&record.month));
            prop_assert!((1..=4).contains(&record.quarter));
            prop_assert_eq!(record.quarter, (record.month + 2) / 3);
            prop_assert_eq!(record.month, record.ledger.date.month());
            prop_assert_eq!(record.year, record.ledger.date.year());
            prop_assert!(record.ledger.consumption.is_some());
            prop_assert!(record.consumption_lag_1.is_finite());
            prop_assert!(record.consumption_roll_mean_3.is_finite());
        }
    }

    #[test]
    fn prop_row_count((series, ledger) in ledger_strategy()) {
        let table = compute_features(&ledger).unwrap();
        let report = &table.report;
        let drugs = series.iter().filter(|s| !s.is_empty()).count();

        prop_assert_eq!(report.drugs, drugs);
        prop_assert_eq!(report.dropped_series_start, drugs);
        prop_assert_eq!(
            table.len(),
            ledger.len() - drugs - report.dropped_missing_consumption
        );

        let expected: usize = series
            .iter()
            .map(|values| {
                values
                    .windows(2)
                    .filter(|pair| pair[0].is_some() && pair[1].is_some())
                    .count()
            })
            .sum();
        prop_assert_eq!(table.len(), expected);
        if drugs > 0 {
            prop_assert!(table.len() < ledger.len());
        }
    }

    #[test]
    fn prop_lag_and_rolling_mean((series, ledger) in ledger_strategy()) {
        let table = compute_features(&ledger).unwrap();
        let by_drug: HashMap<&str, &Vec<Option<f64>>> =
            series.iter().enumerate().map(|(d, s)| (DRUGS[d], s)).collect();

        for record in &table.records {
            let values = by_drug[record.ledger.drug.as_str()];
            let k = month_offset(record);
            prop_assert!(k >= 1);
            prop_assert_eq!(Some(record.consumption_lag_1), values[k - 1]);

            let expected = reference_mean(values, k).unwrap();
            prop_assert!((record.consumption_roll_mean_3 - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_deterministic_and_order_independent((series, ledger) in ledger_strategy()) {
        let first = compute_features(&ledger).unwrap();
        let second = compute_features(&ledger).unwrap();
        prop_assert_eq!(&first, &second);

        let sorted = compute_features(&build_ledger(&series)).unwrap();
        prop_assert_eq!(&first.records, &sorted.records);
    }
}
