//! CSV Ledger Ingest

use crate::error::LedgerError;
use crate::record::RawLedgerRecord;
use crate::schema::{ColumnIndex, ColumnMapping, LedgerField};
use csv::StringRecord;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Cell spellings treated as a missing value
const MISSING_MARKERS: &[&str] = &["", "nan", "na", "n/a", "null", "none"];

/// Read raw ledger rows from CSV with a header row
///
/// Dates are kept as text; normalization belongs to the feature pipeline.
pub fn read_ledger<R: Read>(
    reader: R,
    mapping: &ColumnMapping,
) -> Result<Vec<RawLedgerRecord>, LedgerError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let index = mapping.resolve(csv_reader.headers()?)?;
    debug!("Resolved ledger columns: {:?}", index);

    let mut records = Vec::new();
    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        // Header occupies line 1
        let line = record.position().map(|p| p.line() as usize).unwrap_or(row + 2);
        records.push(parse_row(&record, &index, line)?);
    }

    Ok(records)
}

/// Read raw ledger rows from a CSV file
pub fn read_ledger_file(
    path: impl AsRef<Path>,
    mapping: &ColumnMapping,
) -> Result<Vec<RawLedgerRecord>, LedgerError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| LedgerError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records = read_ledger(file, mapping)?;
    info!("Read {} ledger rows from {}", records.len(), path.display());
    Ok(records)
}

fn parse_row(
    record: &StringRecord,
    index: &ColumnIndex,
    line: usize,
) -> Result<RawLedgerRecord, LedgerError> {
    let quantity = |field: LedgerField| parse_quantity(cell(record, index, field), field, line);

    Ok(RawLedgerRecord {
        date: cell(record, index, LedgerField::Date).to_string(),
        drug: cell(record, index, LedgerField::Drug).to_string(),
        opening_balance: quantity(LedgerField::OpeningBalance)?,
        quantity_received: quantity(LedgerField::QuantityReceived)?,
        consumption: quantity(LedgerField::Consumption)?,
        losses_adjustments: quantity(LedgerField::LossesAdjustments)?,
        closing_balance: quantity(LedgerField::ClosingBalance)?,
        days_out_of_stock: parse_count(cell(record, index, LedgerField::DaysOutOfStock), line)?,
    })
}

/// Cell text for a field; absent columns and short rows read as empty
fn cell<'a>(record: &'a StringRecord, index: &ColumnIndex, field: LedgerField) -> &'a str {
    index
        .position(field)
        .and_then(|i| record.get(i))
        .unwrap_or("")
}

fn is_missing(value: &str) -> bool {
    let value = value.trim();
    MISSING_MARKERS
        .iter()
        .any(|marker| value.eq_ignore_ascii_case(marker))
}

fn parse_quantity(value: &str, field: LedgerField, line: usize) -> Result<Option<f64>, LedgerError> {
    if is_missing(value) {
        return Ok(None);
    }
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(LedgerError::InvalidNumber {
            column: field.default_header(),
            value: value.to_string(),
            line,
        }),
    }
}

/// Day counts may arrive float-formatted ("3.0") from upstream tooling
fn parse_count(value: &str, line: usize) -> Result<Option<u32>, LedgerError> {
    let Some(v) = parse_quantity(value, LedgerField::DaysOutOfStock, line)? else {
        return Ok(None);
    };
    if v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
        return Err(LedgerError::InvalidNumber {
            column: LedgerField::DaysOutOfStock.default_header(),
            value: value.to_string(),
            line,
        });
    }
    Ok(Some(v as u32))
}
