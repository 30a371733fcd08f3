//! Inventory Ledger
//!
//! Provides the monthly drug inventory data model, date normalization,
//! CSV ingest/emit, and a synthetic ledger generator.

mod dates;
mod error;
mod reader;
mod record;
mod schema;
pub mod synthetic;
mod writer;

pub use dates::{month_starts, normalize_date};
pub use error::{LedgerError, MalformedDateError};
pub use reader::{read_ledger, read_ledger_file};
pub use record::{LedgerRecord, RawLedgerRecord};
pub use schema::{ColumnMapping, LedgerField, LEDGER_FIELDS};
pub use writer::{format_quantity, write_ledger, write_ledger_file, CsvRow};
