//! Feature Engineering Engine
//!
//! Turns monthly per-drug inventory ledgers into a supervised-learning
//! feature table: calendar features, lag-1 consumption and a trailing
//! three-month consumption mean, computed per drug in date order.

mod calendar;
mod features;
mod partition;
mod pipeline;
mod window;

pub use calendar::CalendarFeatures;
pub use features::{FeatureRecord, DERIVED_COLUMNS, LAG_PERIODS, ROLLING_MIN_PERIODS, ROLLING_WINDOW};
pub use partition::{DrugPartitions, DuplicateKeyWarning};
pub use pipeline::{
    compute_features, normalize_ledger, FeaturePipeline, FeatureTable, PipelineConfig,
    PipelineReport,
};
pub use window::{lag, rolling_mean, MissingValuePolicy};

use ledger::{LedgerError, MalformedDateError};
use thiserror::Error;

/// Errors from a pipeline run
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A ledger date could not be normalized; no output is produced
    #[error(transparent)]
    MalformedDate(#[from] MalformedDateError),
    /// Writing the feature table failed
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[cfg(test)]
mod properties;
