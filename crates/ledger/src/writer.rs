//! CSV Emit

use crate::error::LedgerError;
use crate::record::LedgerRecord;
use crate::schema::LEDGER_FIELDS;
use chrono::NaiveDate;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// A value that serializes to one row of a headed CSV table
pub trait CsvRow {
    /// Header row
    fn csv_headers() -> Vec<&'static str>;
    /// Cells in header order
    fn csv_cells(&self) -> Vec<String>;
}

/// Format a quantity cell: integral values without a fraction, missing as empty
pub fn format_quantity(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{:.0}", v),
        Some(v) => v.to_string(),
    }
}

impl CsvRow for LedgerRecord<NaiveDate> {
    fn csv_headers() -> Vec<&'static str> {
        LEDGER_FIELDS.iter().map(|f| f.default_header()).collect()
    }

    fn csv_cells(&self) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.drug.clone(),
            format_quantity(self.opening_balance),
            format_quantity(self.quantity_received),
            format_quantity(self.consumption),
            format_quantity(self.losses_adjustments),
            format_quantity(self.closing_balance),
            self.days_out_of_stock.map(|d| d.to_string()).unwrap_or_default(),
        ]
    }
}

/// Write rows as CSV with a header row
pub fn write_ledger<W: Write, T: CsvRow>(writer: W, rows: &[T]) -> Result<(), LedgerError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(T::csv_headers())?;
    for row in rows {
        csv_writer.write_record(row.csv_cells())?;
    }
    csv_writer.flush().map_err(|source| LedgerError::Io {
        path: "<writer>".to_string(),
        source,
    })?;
    Ok(())
}

/// Write rows as CSV to a file, replacing it
pub fn write_ledger_file<T: CsvRow>(path: impl AsRef<Path>, rows: &[T]) -> Result<(), LedgerError> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).map_err(|source| LedgerError::Io {
        path: path.display().to_string(),
        source,
    })?;
    write_ledger(file, rows)?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
