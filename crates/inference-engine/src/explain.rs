//! Per-Feature Explanations

use serde::{Deserialize, Serialize};

/// Contribution of one feature to the stock-out score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub feature: String,
    /// Raw input value
    pub value: f64,
    /// Contribution in log-odds relative to the base value
    pub contribution: f64,
}

/// Additive explanation of one prediction
///
/// `base_value` plus the sum of contributions equals the model's log-odds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub base_value: f64,
    pub attributions: Vec<Attribution>,
}

impl Explanation {
    /// Reconstructed log-odds
    pub fn output_value(&self) -> f64 {
        self.base_value + self.attributions.iter().map(|a| a.contribution).sum::<f64>()
    }

    /// Attributions sorted by absolute contribution, largest first
    pub fn ranked(&self) -> Vec<&Attribution> {
        let mut ranked: Vec<&Attribution> = self.attributions.iter().collect();
        ranked.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explanation() -> Explanation {
        Explanation {
            base_value: -1.0,
            attributions: vec![
                Attribution { feature: "a".into(), value: 1.0, contribution: 0.5 },
                Attribution { feature: "b".into(), value: 2.0, contribution: -2.0 },
                Attribution { feature: "c".into(), value: 3.0, contribution: 1.5 },
            ],
        }
    }

    #[test]
    fn test_output_value_is_additive() {
        assert!((explanation().output_value() - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_ranked_by_magnitude() {
        let e = explanation();
        let order: Vec<&str> = e.ranked().iter().map(|a| a.feature.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }
}
