//! Model Input Assembly

use crate::InferenceError;
use feature_engine::FeatureRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Feature vector in a model's trained column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInput {
    names: Vec<String>,
    values: Vec<f64>,
}

impl ModelInput {
    /// Pull the named columns out of a feature record
    pub fn from_record(record: &FeatureRecord, names: &[String]) -> Result<Self, InferenceError> {
        let values = names
            .iter()
            .map(|name| {
                record
                    .value(name)
                    .ok_or_else(|| InferenceError::MissingFeature(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            names: names.to_vec(),
            values,
        })
    }

    /// Order a name → value map by the model's columns.
    /// Exact names win; otherwise names match case-insensitively.
    pub fn from_map(features: &HashMap<String, f64>, names: &[String]) -> Result<Self, InferenceError> {
        let values = names
            .iter()
            .map(|name| {
                features
                    .get(name)
                    .or_else(|| {
                        features
                            .iter()
                            .find(|(k, _)| k.eq_ignore_ascii_case(name))
                            .map(|(_, v)| v)
                    })
                    .copied()
                    .ok_or_else(|| InferenceError::MissingFeature(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            names: names.to_vec(),
            values,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
