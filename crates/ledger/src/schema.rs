//! Column Mapping between tabular headers and ledger fields

use crate::error::LedgerError;
use csv::StringRecord;
use serde::{Deserialize, Serialize};

/// Semantic ledger field, declared in canonical column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerField {
    Date,
    Drug,
    OpeningBalance,
    QuantityReceived,
    Consumption,
    LossesAdjustments,
    ClosingBalance,
    DaysOutOfStock,
}

/// All ledger fields in canonical column order
pub const LEDGER_FIELDS: [LedgerField; 8] = [
    LedgerField::Date,
    LedgerField::Drug,
    LedgerField::OpeningBalance,
    LedgerField::QuantityReceived,
    LedgerField::Consumption,
    LedgerField::LossesAdjustments,
    LedgerField::ClosingBalance,
    LedgerField::DaysOutOfStock,
];

impl LedgerField {
    /// Canonical header name
    pub fn default_header(&self) -> &'static str {
        match self {
            LedgerField::Date => "Date",
            LedgerField::Drug => "Drug",
            LedgerField::OpeningBalance => "Opening_Balance",
            LedgerField::QuantityReceived => "Quantity_Received",
            LedgerField::Consumption => "Consumption",
            LedgerField::LossesAdjustments => "Losses_Adjustments",
            LedgerField::ClosingBalance => "Closing_Balance",
            LedgerField::DaysOutOfStock => "Days_Out_of_Stock",
        }
    }

    /// Whether ingest fails when the column is absent.
    /// Optional columns read as missing values on every row.
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            LedgerField::Date | LedgerField::Drug | LedgerField::Consumption
        )
    }
}

/// Header name for each ledger field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub date: String,
    pub drug: String,
    pub opening_balance: String,
    pub quantity_received: String,
    pub consumption: String,
    pub losses_adjustments: String,
    pub closing_balance: String,
    pub days_out_of_stock: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date: LedgerField::Date.default_header().to_string(),
            drug: LedgerField::Drug.default_header().to_string(),
            opening_balance: LedgerField::OpeningBalance.default_header().to_string(),
            quantity_received: LedgerField::QuantityReceived.default_header().to_string(),
            consumption: LedgerField::Consumption.default_header().to_string(),
            losses_adjustments: LedgerField::LossesAdjustments.default_header().to_string(),
            closing_balance: LedgerField::ClosingBalance.default_header().to_string(),
            days_out_of_stock: LedgerField::DaysOutOfStock.default_header().to_string(),
        }
    }
}

/// Resolved column positions for one header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColumnIndex {
    positions: [Option<usize>; 8],
}

impl ColumnIndex {
    /// Position of a field in the record, if the column exists
    pub(crate) fn position(&self, field: LedgerField) -> Option<usize> {
        self.positions[field as usize]
    }
}

/// Fold a header to a comparison key: case-insensitive, `_`/`-`/space equivalent
fn header_key(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

impl ColumnMapping {
    /// Header configured for a field
    pub fn header(&self, field: LedgerField) -> &str {
        match field {
            LedgerField::Date => &self.date,
            LedgerField::Drug => &self.drug,
            LedgerField::OpeningBalance => &self.opening_balance,
            LedgerField::QuantityReceived => &self.quantity_received,
            LedgerField::Consumption => &self.consumption,
            LedgerField::LossesAdjustments => &self.losses_adjustments,
            LedgerField::ClosingBalance => &self.closing_balance,
            LedgerField::DaysOutOfStock => &self.days_out_of_stock,
        }
    }

    /// Locate every mapped column in a header row
    pub(crate) fn resolve(&self, headers: &StringRecord) -> Result<ColumnIndex, LedgerError> {
        let keys: Vec<String> = headers.iter().map(header_key).collect();
        let mut positions = [None; 8];

        for (slot, field) in LEDGER_FIELDS.iter().enumerate() {
            let wanted = header_key(self.header(*field));
            positions[slot] = keys.iter().position(|k| *k == wanted);

            if positions[slot].is_none() && field.is_required() {
                return Err(LedgerError::MissingColumn(self.header(*field).to_string()));
            }
        }

        Ok(ColumnIndex { positions })
    }
}
