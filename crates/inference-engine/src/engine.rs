//! Inference Engine Implementation

use crate::explain::Explanation;
use crate::input::ModelInput;
use crate::model::LogisticModel;
use crate::risk::{RiskLevel, RiskThresholds};
use crate::{InferenceError, StockoutClassifier};
use feature_engine::FeatureRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Prediction for one drug-month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockoutPrediction {
    /// Predicted class: 1 = stock-out expected
    pub label: u8,
    /// `[p(no stock-out), p(stock-out)]`
    pub probabilities: [f64; 2],
    pub risk: RiskLevel,
    pub explanation: Explanation,
    /// Inference latency in milliseconds
    pub latency_ms: u64,
}

impl StockoutPrediction {
    /// Probability of a stock-out
    pub fn stockout_probability(&self) -> f64 {
        self.probabilities[1]
    }
}

/// Runs a stock-out classifier over feature rows
pub struct InferenceEngine {
    classifier: Box<dyn StockoutClassifier>,
    thresholds: RiskThresholds,
}

impl InferenceEngine {
    /// Create an engine around any classifier
    pub fn new(classifier: Box<dyn StockoutClassifier>, thresholds: RiskThresholds) -> Self {
        info!(
            "Creating inference engine over {} features",
            classifier.feature_names().len()
        );
        Self {
            classifier,
            thresholds,
        }
    }

    /// Engine backed by the built-in baseline model
    pub fn baseline() -> Self {
        Self::new(Box::new(LogisticModel::baseline()), RiskThresholds::default())
    }

    /// Load a model artifact, or use the baseline when no path is configured
    pub fn from_model_path(path: Option<&Path>) -> Result<Self, InferenceError> {
        match path {
            Some(path) => Ok(Self::new(
                Box::new(LogisticModel::load(path)?),
                RiskThresholds::default(),
            )),
            None => {
                info!("No model artifact configured, using baseline model");
                Ok(Self::baseline())
            }
        }
    }

    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Feature columns the classifier expects
    pub fn feature_names(&self) -> &[String] {
        self.classifier.feature_names()
    }

    /// Predict for a row of the feature table
    pub fn predict_record(&self, record: &FeatureRecord) -> Result<StockoutPrediction, InferenceError> {
        let input = ModelInput::from_record(record, self.classifier.feature_names())?;
        self.predict_input(&input)
    }

    /// Predict from a name → value map
    pub fn predict_features(
        &self,
        features: &HashMap<String, f64>,
    ) -> Result<StockoutPrediction, InferenceError> {
        let input = ModelInput::from_map(features, self.classifier.feature_names())?;
        self.predict_input(&input)
    }

    /// Predict from an already assembled input vector
    pub fn predict_input(&self, input: &ModelInput) -> Result<StockoutPrediction, InferenceError> {
        let start = std::time::Instant::now();

        let probabilities = self.classifier.predict_proba(input)?;
        let label = self.classifier.predict(input)?;
        let explanation = self.classifier.explain(input)?;
        let risk = self.thresholds.from_probability(probabilities[1]);

        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Inference completed in {}ms: label={} risk={}",
            latency_ms, label, risk
        );
        metrics::counter!("predictions_total", "label" => label.to_string()).increment(1);

        Ok(StockoutPrediction {
            label,
            probabilities,
            risk,
            explanation,
            latency_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger::RawLedgerRecord;

    fn ledger_row(date: &str, consumption: f64, closing: f64) -> RawLedgerRecord {
        let mut row = RawLedgerRecord::new(date.to_string(), "Metformin 500mg", Some(consumption));
        row.opening_balance = Some(closing + consumption);
        row.quantity_received = Some(0.0);
        row.losses_adjustments = Some(0.0);
        row.closing_balance = Some(closing);
        row
    }

    #[test]
    fn test_predict_record_from_feature_table() {
        let ledger = vec![
            ledger_row("2024-01-01", 850.0, 300.0),
            ledger_row("2024-02-01", 900.0, 0.0),
        ];
        let table = feature_engine::compute_features(&ledger).unwrap();
        let engine = InferenceEngine::baseline();

        let prediction = engine.predict_record(&table.records[0]).unwrap();
        assert_eq!(prediction.label, 1);
        assert!(prediction.risk >= RiskLevel::High);
        assert_eq!(prediction.explanation.attributions.len(), 10);
    }

    #[test]
    fn test_predict_features_missing_column() {
        let engine = InferenceEngine::baseline();
        let features = HashMap::from([("Consumption".to_string(), 10.0)]);
        assert!(matches!(
            engine.predict_features(&features),
            Err(InferenceError::MissingFeature(_))
        ));
    }

    #[test]
    fn test_custom_classifier() {
        struct Constant(Vec<String>);

        impl StockoutClassifier for Constant {
            fn feature_names(&self) -> &[String] {
                &self.0
            }

            fn predict_proba(&self, _: &ModelInput) -> Result<[f64; 2], InferenceError> {
                Ok([0.2, 0.8])
            }

            fn explain(&self, _: &ModelInput) -> Result<Explanation, InferenceError> {
                Ok(Explanation {
                    base_value: 0.0,
                    attributions: Vec::new(),
                })
            }
        }

        let engine = InferenceEngine::new(
            Box::new(Constant(vec!["month".to_string()])),
            RiskThresholds::default(),
        );
        let features = HashMap::from([("month".to_string(), 4.0)]);
        let prediction = engine.predict_features(&features).unwrap();

        assert_eq!(prediction.label, 1);
        assert_eq!(prediction.risk, RiskLevel::High);
        assert_eq!(prediction.stockout_probability(), 0.8);
    }

    #[test]
    fn test_without_model_path_uses_baseline() {
        let engine = InferenceEngine::from_model_path(None).unwrap();
        assert_eq!(engine.feature_names().len(), 10);
    }
}
