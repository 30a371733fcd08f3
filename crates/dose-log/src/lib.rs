//! Dose Log
//!
//! An append-only record of medication doses. The log is owned by the caller:
//! [`log_dose`] takes the current log and hands back the extended one, so the
//! hosting layer decides where it lives between interactions.

mod log;

pub use log::{log_dose, DoseEntry, DoseLog, EMPTY_LOG_MESSAGE};
