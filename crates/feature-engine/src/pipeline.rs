//! Feature Pipeline
//!
//! Ledger rows → normalized dates → calendar features → per-drug partitions
//! in date order → lag-1 and rolling mean → drop incomplete rows.

use crate::calendar::CalendarFeatures;
use crate::features::{FeatureRecord, LAG_PERIODS, ROLLING_MIN_PERIODS, ROLLING_WINDOW};
use crate::partition::{DrugPartitions, DuplicateKeyWarning};
use crate::window::{lag, rolling_mean, MissingValuePolicy};
use crate::FeatureError;
use ledger::{normalize_date, LedgerRecord, MalformedDateError, RawLedgerRecord};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Pipeline configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Treatment of missing consumption inside the rolling window
    pub missing_policy: MissingValuePolicy,
}

/// Row accounting for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub input_rows: usize,
    pub output_rows: usize,
    /// Distinct drugs with at least one record
    pub drugs: usize,
    /// First month of each drug series (no lag available)
    pub dropped_series_start: usize,
    /// Later rows dropped because consumption was missing here or in the history
    pub dropped_missing_consumption: usize,
    pub duplicate_keys: Vec<DuplicateKeyWarning>,
}

impl PipelineReport {
    /// Total rows removed
    pub fn dropped(&self) -> usize {
        self.dropped_series_start + self.dropped_missing_consumption
    }
}

/// Pipeline output: feature records ordered by drug, then date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    pub records: Vec<FeatureRecord>,
    pub report: PipelineReport,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the table as CSV (ledger columns followed by derived columns)
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), FeatureError> {
        ledger::write_ledger(writer, &self.records)?;
        Ok(())
    }

    /// Write the table to a CSV file
    pub fn write_csv_file(&self, path: impl AsRef<Path>) -> Result<(), FeatureError> {
        ledger::write_ledger_file(path, &self.records)?;
        Ok(())
    }
}

/// A row with its derived values, before the completeness filter
struct CandidateRow {
    ledger: LedgerRecord,
    calendar: CalendarFeatures,
    consumption_lag_1: Option<f64>,
    consumption_roll_mean_3: Option<f64>,
}

impl CandidateRow {
    /// Required fields: consumption and both history features.
    /// Calendar fields are always defined; other ledger columns may be missing.
    fn into_complete(self) -> Option<FeatureRecord> {
        match (
            self.ledger.consumption,
            self.consumption_lag_1,
            self.consumption_roll_mean_3,
        ) {
            (Some(_), Some(lag), Some(mean)) => {
                Some(FeatureRecord::new(self.ledger, self.calendar, lag, mean))
            }
            _ => None,
        }
    }
}

/// Feature pipeline
#[derive(Debug, Clone, Default)]
pub struct FeaturePipeline {
    config: PipelineConfig,
}

impl FeaturePipeline {
    /// Create a pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run on raw rows; any malformed date aborts the whole run
    pub fn run(&self, ledger: &[RawLedgerRecord]) -> Result<FeatureTable, FeatureError> {
        let normalized = normalize_ledger(ledger)?;
        Ok(self.run_normalized(normalized))
    }

    /// Run on rows whose dates are already calendar dates
    pub fn run_normalized(&self, ledger: Vec<LedgerRecord>) -> FeatureTable {
        let input_rows = ledger.len();
        info!(
            "Computing features for {} ledger rows (missing policy {:?})",
            input_rows, self.config.missing_policy
        );

        let ledger = ledger.into_iter().map(LedgerRecord::with_finite_quantities).collect();
        let partitions = DrugPartitions::from_records(ledger);
        let mut report = PipelineReport {
            input_rows,
            drugs: partitions.len(),
            duplicate_keys: partitions.duplicates().to_vec(),
            ..Default::default()
        };

        let mut records = Vec::with_capacity(input_rows);
        for (drug, series) in partitions.into_series() {
            let before = records.len();
            for (position, row) in self.derive_series(series).into_iter().enumerate() {
                match row.into_complete() {
                    Some(record) => records.push(record),
                    None if position == 0 => report.dropped_series_start += 1,
                    None => report.dropped_missing_consumption += 1,
                }
            }
            debug!("{}: kept {} rows", drug, records.len() - before);
        }

        report.output_rows = records.len();
        record_metrics(&report);
        info!(
            "Feature table ready: {} of {} rows kept across {} drugs",
            report.output_rows, report.input_rows, report.drugs
        );

        FeatureTable { records, report }
    }

    /// Windowed scan over one drug's date-ordered series
    fn derive_series(&self, series: Vec<LedgerRecord>) -> Vec<CandidateRow> {
        let consumption: Vec<Option<f64>> = series.iter().map(|r| r.consumption).collect();
        let lagged = lag(&consumption, LAG_PERIODS);
        let rolling = rolling_mean(
            &consumption,
            ROLLING_WINDOW,
            ROLLING_MIN_PERIODS,
            self.config.missing_policy,
        );

        series
            .into_iter()
            .zip(lagged.into_iter().zip(rolling))
            .map(|(ledger, (lag_1, mean_3))| CandidateRow {
                calendar: CalendarFeatures::from_date(ledger.date),
                ledger,
                consumption_lag_1: lag_1,
                consumption_roll_mean_3: mean_3,
            })
            .collect()
    }
}

/// Compute the feature table with the default configuration
pub fn compute_features(ledger: &[RawLedgerRecord]) -> Result<FeatureTable, FeatureError> {
    FeaturePipeline::default().run(ledger)
}

/// Normalize every date, failing on the first one that cannot be parsed
pub fn normalize_ledger(ledger: &[RawLedgerRecord]) -> Result<Vec<LedgerRecord>, MalformedDateError> {
    ledger
        .iter()
        .enumerate()
        .map(|(row, record)| match normalize_date(&record.date) {
            Some(date) => Ok(record.clone().with_date(date)),
            None => Err(MalformedDateError {
                row,
                value: record.date.clone(),
            }),
        })
        .collect()
}

fn record_metrics(report: &PipelineReport) {
    metrics::counter!("pipeline_runs_total").increment(1);
    metrics::counter!("pipeline_rows_in_total").increment(report.input_rows as u64);
    metrics::counter!("pipeline_rows_out_total").increment(report.output_rows as u64);
    metrics::counter!("pipeline_rows_dropped_total").increment(report.dropped() as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, drug: &str, consumption: Option<f64>) -> RawLedgerRecord {
        RawLedgerRecord::new(date.to_string(), drug, consumption)
    }

    fn metformin(consumption: &[Option<f64>]) -> Vec<RawLedgerRecord> {
        consumption
            .iter()
            .enumerate()
            .map(|(i, c)| raw(&format!("2024-{:02}-01", i + 1), "Metformin", *c))
            .collect()
    }

    #[test]
    fn test_metformin_scenario() {
        let table = compute_features(&metformin(&[Some(100.0), Some(110.0), Some(120.0)])).unwrap();

        assert_eq!(table.len(), 2);
        let feb = &table.records[0];
        assert_eq!(feb.month, 2);
        assert_eq!(feb.consumption_lag_1, 100.0);
        assert_eq!(feb.consumption_roll_mean_3, 105.0);

        let mar = &table.records[1];
        assert_eq!(mar.month, 3);
        assert_eq!(mar.consumption_lag_1, 110.0);
        assert_eq!(mar.consumption_roll_mean_3, 110.0);
    }

    #[test]
    fn test_single_record_series_yields_nothing() {
        let table = compute_features(&[raw("2024-01-01", "Insulin Mixtard", Some(40.0))]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.report.dropped_series_start, 1);
    }

    #[test]
    fn test_two_rows_one_output() {
        let table = compute_features(&metformin(&[Some(100.0), Some(110.0)])).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].consumption_lag_1, 100.0);
    }

    #[test]
    fn test_empty_ledger() {
        let table = compute_features(&[]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.report, PipelineReport::default());
    }

    #[test]
    fn test_unsorted_mixed_drugs() {
        let ledger = vec![
            raw("2024-03-01", "Metformin", Some(120.0)),
            raw("2024-02-01", "Amlodipine", Some(20.0)),
            raw("2024-01-01", "Metformin", Some(100.0)),
            raw("2024-01-01", "Amlodipine", Some(10.0)),
            raw("2024-02-01", "Metformin", Some(110.0)),
        ];
        let table = compute_features(&ledger).unwrap();

        let rows: Vec<(&str, u32, f64)> = table
            .records
            .iter()
            .map(|r| (r.ledger.drug.as_str(), r.month, r.consumption_lag_1))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Amlodipine", 2, 10.0),
                ("Metformin", 2, 100.0),
                ("Metformin", 3, 110.0),
            ]
        );
        // Lag never leaks across drugs
        assert_eq!(table.report.drugs, 2);
        assert_eq!(table.report.dropped_series_start, 2);
    }

    #[test]
    fn test_malformed_date_aborts() {
        let ledger = vec![
            raw("2024-01-01", "Metformin", Some(100.0)),
            raw("sometime in feb", "Metformin", Some(110.0)),
        ];
        let err = compute_features(&ledger).unwrap_err();
        match err {
            FeatureError::MalformedDate(e) => {
                assert_eq!(e.row, 1);
                assert_eq!(e.value, "sometime in feb");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mixed_date_formats_normalize() {
        let ledger = vec![
            raw("01/01/2024", "Metformin", Some(100.0)),
            raw("2024-02-01 00:00:00", "Metformin", Some(110.0)),
        ];
        let table = compute_features(&ledger).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].year, 2024);
        assert_eq!(table.records[0].month, 2);
    }

    #[test]
    fn test_missing_consumption_skip_policy() {
        // Jan..Jun with April missing
        let ledger = metformin(&[
            Some(100.0),
            Some(110.0),
            Some(120.0),
            None,
            Some(140.0),
            Some(150.0),
        ]);
        let table = compute_features(&ledger).unwrap();

        let months: Vec<u32> = table.records.iter().map(|r| r.month).collect();
        // April (missing) and May (lag missing) drop; June survives
        assert_eq!(months, vec![2, 3, 6]);
        let june = &table.records[2];
        assert_eq!(june.consumption_lag_1, 140.0);
        assert_eq!(june.consumption_roll_mean_3, 145.0);
        assert_eq!(table.report.dropped_missing_consumption, 2);
    }

    #[test]
    fn test_nan_consumption_is_missing() {
        let table = compute_features(&metformin(&[Some(100.0), Some(f64::NAN), Some(120.0)])).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.report.dropped_missing_consumption, 2);

        let table = compute_features(&metformin(&[
            Some(100.0),
            Some(f64::NAN),
            Some(120.0),
            Some(f64::INFINITY),
            Some(140.0),
            Some(150.0),
        ]))
        .unwrap();
        let months: Vec<u32> = table.records.iter().map(|r| r.month).collect();
        assert_eq!(months, vec![6]);
        assert_eq!(table.records[0].consumption_roll_mean_3, 145.0);
        assert!(table
            .records
            .iter()
            .all(|r| r.consumption_roll_mean_3.is_finite() && r.consumption_lag_1.is_finite()));
    }

    #[test]
    fn test_missing_consumption_propagate_policy() {
        let ledger = metformin(&[
            Some(100.0),
            Some(110.0),
            Some(120.0),
            None,
            Some(140.0),
            Some(150.0),
            Some(160.0),
        ]);
        let pipeline = FeaturePipeline::new(PipelineConfig {
            missing_policy: MissingValuePolicy::Propagate,
        });
        let table = pipeline.run(&ledger).unwrap();

        let months: Vec<u32> = table.records.iter().map(|r| r.month).collect();
        // April poisons the windows ending in April, May and June
        assert_eq!(months, vec![2, 3, 7]);
        assert_eq!(table.records[2].consumption_roll_mean_3, 150.0);
    }

    #[test]
    fn test_negative_consumption_is_carried() {
        let table = compute_features(&metformin(&[Some(100.0), Some(-50.0), Some(110.0)])).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].ledger.consumption, Some(-50.0));
        assert_eq!(table.records[0].consumption_roll_mean_3, 25.0);
        assert_eq!(table.records[1].consumption_lag_1, -50.0);
    }

    #[test]
    fn test_missing_unrelated_columns_do_not_drop() {
        let ledger = metformin(&[Some(100.0), Some(110.0)]);
        assert!(ledger.iter().all(|r| r.closing_balance.is_none()));
        let table = compute_features(&ledger).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicate_keys_reported() {
        let ledger = vec![
            raw("2024-01-01", "Metformin", Some(100.0)),
            raw("2024-02-01", "Metformin", Some(110.0)),
            raw("2024-02-01", "Metformin", Some(111.0)),
        ];
        let table = compute_features(&ledger).unwrap();

        assert_eq!(table.report.duplicate_keys.len(), 1);
        assert_eq!(table.report.duplicate_keys[0].count, 2);
        // The later duplicate sees the earlier one as its previous month
        assert_eq!(table.records[1].consumption_lag_1, 110.0);
    }

    #[test]
    fn test_csv_output() {
        let table = compute_features(&metformin(&[Some(100.0), Some(110.0), Some(120.0)])).unwrap();
        let mut buffer = Vec::new();
        table.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("month,year,quarter,consumption_lag_1,consumption_roll_mean_3"));
        assert_eq!(lines[1], "2024-02-01,Metformin,,,110,,,,2,2024,1,100,105");
    }
}
