//! Logistic Stock-Out Model

use crate::explain::{Attribution, Explanation};
use crate::input::ModelInput;
use crate::{InferenceError, StockoutClassifier};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

fn default_threshold() -> f64 {
    0.5
}

/// Standardized logistic regression loaded from a JSON artifact
///
/// `p(stock-out) = σ(intercept + Σ wᵢ · (xᵢ − meanᵢ) / scaleᵢ)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub feature_names: Vec<String>,
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
    /// Decision threshold on p(stock-out)
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticModel {
    /// Parse and validate a JSON artifact
    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| InferenceError::ModelLoadError(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    /// Load a JSON artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
        let model = Self::from_json(&json)?;
        info!(
            "Loaded logistic model from {} ({} features)",
            path.display(),
            model.feature_names.len()
        );
        Ok(model)
    }

    /// Built-in placeholder artifact over the full feature table
    pub fn baseline() -> Self {
        let columns: [(&str, f64, f64, f64); 10] = [
            // (feature, weight, mean, scale)
            ("Opening_Balance", -0.6, 1500.0, 1200.0),
            ("Quantity_Received", -0.8, 700.0, 1000.0),
            ("Consumption", 0.9, 600.0, 450.0),
            ("Losses_Adjustments", 0.2, 15.0, 15.0),
            ("Closing_Balance", -1.8, 1200.0, 1100.0),
            ("month", 0.0, 6.5, 3.45),
            ("year", 0.0, 2022.0, 1.41),
            ("quarter", 0.05, 2.5, 1.12),
            ("consumption_lag_1", 0.4, 600.0, 450.0),
            ("consumption_roll_mean_3", 0.7, 600.0, 400.0),
        ];

        Self {
            feature_names: columns.iter().map(|c| c.0.to_string()).collect(),
            weights: columns.iter().map(|c| c.1).collect(),
            intercept: -1.2,
            means: columns.iter().map(|c| c.2).collect(),
            scales: columns.iter().map(|c| c.3).collect(),
            threshold: default_threshold(),
        }
    }

    /// Check that the artifact is internally consistent
    pub fn validate(&self) -> Result<(), InferenceError> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err(InferenceError::InvalidModel("no features".to_string()));
        }
        for (name, len) in [
            ("weights", self.weights.len()),
            ("means", self.means.len()),
            ("scales", self.scales.len()),
        ] {
            if len != n {
                return Err(InferenceError::InvalidModel(format!(
                    "{} has {} entries for {} features",
                    name, len, n
                )));
            }
        }
        if let Some(i) = self.scales.iter().position(|s| !s.is_finite() || *s <= 0.0) {
            return Err(InferenceError::InvalidModel(format!(
                "scale for {} must be positive",
                self.feature_names[i]
            )));
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(InferenceError::InvalidModel(format!(
                "threshold {} outside (0, 1)",
                self.threshold
            )));
        }
        Ok(())
    }

    fn check_shape(&self, input: &ModelInput) -> Result<(), InferenceError> {
        if input.len() != self.feature_names.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.feature_names.len(),
                actual: input.len(),
            });
        }
        let misplaced = self
            .feature_names
            .iter()
            .zip(input.names())
            .position(|(expected, actual)| expected != actual);
        if let Some(position) = misplaced {
            return Err(InferenceError::FeatureOrderMismatch {
                position,
                expected: self.feature_names[position].clone(),
                actual: input.names()[position].clone(),
            });
        }
        Ok(())
    }

    /// Per-feature log-odds terms
    fn contributions(&self, input: &ModelInput) -> Result<Vec<f64>, InferenceError> {
        self.check_shape(input)?;
        Ok(input
            .values()
            .iter()
            .zip(&self.weights)
            .zip(self.means.iter().zip(&self.scales))
            .map(|((x, w), (mean, scale))| w * (x - mean) / scale)
            .collect())
    }

    fn log_odds(&self, input: &ModelInput) -> Result<f64, InferenceError> {
        Ok(self.intercept + self.contributions(input)?.iter().sum::<f64>())
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl StockoutClassifier for LogisticModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, input: &ModelInput) -> Result<[f64; 2], InferenceError> {
        let p1 = sigmoid(self.log_odds(input)?);
        debug!("Stock-out probability {:.3}", p1);
        Ok([1.0 - p1, p1])
    }

    fn explain(&self, input: &ModelInput) -> Result<Explanation, InferenceError> {
        let attributions = self
            .contributions(input)?
            .into_iter()
            .zip(self.feature_names.iter().zip(input.values()))
            .map(|(contribution, (feature, value))| Attribution {
                feature: feature.clone(),
                value: *value,
                contribution,
            })
            .collect();

        Ok(Explanation {
            base_value: self.intercept,
            attributions,
        })
    }

    fn predict(&self, input: &ModelInput) -> Result<u8, InferenceError> {
        let [_, p1] = self.predict_proba(input)?;
        Ok(u8::from(p1 >= self.threshold))
    }
}
