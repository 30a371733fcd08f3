//! Stock-Out Inference Engine
//!
//! Defines the classifier/explainer interface the feature table is fed to,
//! a logistic-regression implementation loaded from a JSON artifact, and
//! the mapping from stock-out probability to a risk level.

mod engine;
mod explain;
mod input;
mod model;
mod risk;

pub use engine::{InferenceEngine, StockoutPrediction};
pub use explain::{Attribution, Explanation};
pub use input::ModelInput;
pub use model::LogisticModel;
pub use risk::{RiskLevel, RiskThresholds};

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Invalid model artifact: {0}")]
    InvalidModel(String),
    #[error("Missing feature: {0}")]
    MissingFeature(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Feature order mismatch at column {position}: expected {expected}, got {actual}")]
    FeatureOrderMismatch {
        position: usize,
        expected: String,
        actual: String,
    },
}

/// Binary stock-out classifier with per-feature explanations
///
/// Inputs must be assembled in `feature_names()` order; see [`ModelInput`].
pub trait StockoutClassifier: Send + Sync {
    /// Feature columns in the order the model was trained with
    fn feature_names(&self) -> &[String];

    /// Class probabilities `[p(no stock-out), p(stock-out)]`
    fn predict_proba(&self, input: &ModelInput) -> Result<[f64; 2], InferenceError>;

    /// Per-feature contributions to the stock-out score
    fn explain(&self, input: &ModelInput) -> Result<Explanation, InferenceError>;

    /// Predicted class: 1 = stock-out expected
    fn predict(&self, input: &ModelInput) -> Result<u8, InferenceError> {
        let [_, p1] = self.predict_proba(input)?;
        Ok(u8::from(p1 >= 0.5))
    }
}
