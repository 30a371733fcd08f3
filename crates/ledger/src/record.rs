//! Ledger Records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One drug's inventory state for one calendar month
///
/// Generic over the date representation so that rows read from a file
/// (`RawLedgerRecord`, date still text) and normalized rows share one shape.
/// Quantities are `None` when the source cell was empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord<D = NaiveDate> {
    /// First day of the month
    pub date: D,
    /// Drug identifier
    pub drug: String,
    pub opening_balance: Option<f64>,
    pub quantity_received: Option<f64>,
    /// May be missing, negative, or an outlier upstream
    pub consumption: Option<f64>,
    pub losses_adjustments: Option<f64>,
    pub closing_balance: Option<f64>,
    pub days_out_of_stock: Option<u32>,
}

/// Ledger row as read from a file, before date normalization
pub type RawLedgerRecord = LedgerRecord<String>;

impl<D> LedgerRecord<D> {
    /// Create a record with only date, drug and consumption set
    pub fn new(date: D, drug: impl Into<String>, consumption: Option<f64>) -> Self {
        Self {
            date,
            drug: drug.into(),
            opening_balance: None,
            quantity_received: None,
            consumption,
            losses_adjustments: None,
            closing_balance: None,
            days_out_of_stock: None,
        }
    }

    /// Replace the date, keeping every other field
    pub fn with_date<E>(self, date: E) -> LedgerRecord<E> {
        LedgerRecord {
            date,
            drug: self.drug,
            opening_balance: self.opening_balance,
            quantity_received: self.quantity_received,
            consumption: self.consumption,
            losses_adjustments: self.losses_adjustments,
            closing_balance: self.closing_balance,
            days_out_of_stock: self.days_out_of_stock,
        }
    }

    /// Treat NaN and infinite quantities as missing
    pub fn with_finite_quantities(mut self) -> Self {
        for quantity in [
            &mut self.opening_balance,
            &mut self.quantity_received,
            &mut self.consumption,
            &mut self.losses_adjustments,
            &mut self.closing_balance,
        ] {
            *quantity = quantity.filter(|v| v.is_finite());
        }
        self
    }
}

impl LedgerRecord<NaiveDate> {
    /// Convert back to the raw form with an ISO-8601 date
    pub fn to_raw(&self) -> RawLedgerRecord {
        self.clone().with_date(self.date.format("%Y-%m-%d").to_string())
    }
}
