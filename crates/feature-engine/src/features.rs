//! Feature Records

use crate::calendar::CalendarFeatures;
use chrono::NaiveDate;
use ledger::{format_quantity, CsvRow, LedgerRecord};
use serde::{Deserialize, Serialize};

/// Names of the columns the pipeline derives, in output order
pub const DERIVED_COLUMNS: [&str; 5] = [
    "month",
    "year",
    "quarter",
    "consumption_lag_1",
    "consumption_roll_mean_3",
];

/// Lag distance encoded in `consumption_lag_1`
pub const LAG_PERIODS: usize = 1;
/// Window length encoded in `consumption_roll_mean_3`
pub const ROLLING_WINDOW: usize = 3;
/// Minimum present values for a rolling mean
pub const ROLLING_MIN_PERIODS: usize = 1;

/// A ledger record extended with calendar and per-drug history features
///
/// Only complete rows become feature records: `ledger.consumption` is always
/// present and every derived field is defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(flatten)]
    pub ledger: LedgerRecord,
    pub month: u32,
    pub year: i32,
    pub quarter: u32,
    /// Previous month's consumption for the same drug
    pub consumption_lag_1: f64,
    /// Mean consumption over this and up to two preceding months
    pub consumption_roll_mean_3: f64,
}

impl FeatureRecord {
    pub(crate) fn new(
        ledger: LedgerRecord,
        calendar: CalendarFeatures,
        consumption_lag_1: f64,
        consumption_roll_mean_3: f64,
    ) -> Self {
        Self {
            ledger,
            month: calendar.month,
            year: calendar.year,
            quarter: calendar.quarter,
            consumption_lag_1,
            consumption_roll_mean_3,
        }
    }

    /// Whether the drug ran out during the month (the training label)
    pub fn stocked_out(&self) -> Option<bool> {
        self.ledger.days_out_of_stock.map(|days| days > 0)
    }

    /// Numeric value of a column by name
    ///
    /// Accepts both ledger header names (`Closing_Balance`) and derived
    /// column names; matching is case-insensitive.
    pub fn value(&self, column: &str) -> Option<f64> {
        let ledger = &self.ledger;
        match column.to_ascii_lowercase().as_str() {
            "opening_balance" => ledger.opening_balance,
            "quantity_received" => ledger.quantity_received,
            "consumption" => ledger.consumption,
            "losses_adjustments" => ledger.losses_adjustments,
            "closing_balance" => ledger.closing_balance,
            "days_out_of_stock" => ledger.days_out_of_stock.map(f64::from),
            "month" => Some(f64::from(self.month)),
            "year" => Some(f64::from(self.year)),
            "quarter" => Some(f64::from(self.quarter)),
            "consumption_lag_1" => Some(self.consumption_lag_1),
            "consumption_roll_mean_3" => Some(self.consumption_roll_mean_3),
            _ => None,
        }
    }
}

impl CsvRow for FeatureRecord {
    fn csv_headers() -> Vec<&'static str> {
        let mut headers = <LedgerRecord<NaiveDate> as CsvRow>::csv_headers();
        headers.extend(DERIVED_COLUMNS);
        headers
    }

    fn csv_cells(&self) -> Vec<String> {
        let mut cells = self.ledger.csv_cells();
        cells.push(self.month.to_string());
        cells.push(self.year.to_string());
        cells.push(self.quarter.to_string());
        cells.push(format_quantity(Some(self.consumption_lag_1)));
        cells.push(format_quantity(Some(self.consumption_roll_mean_3)));
        cells
    }
}
