//! Stock-Out Risk Levels

use serde::{Deserialize, Serialize};

/// Risk band for a predicted stock-out probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Risk band under the default thresholds
    pub fn from_probability(probability: f64) -> Self {
        RiskThresholds::default().from_probability(probability)
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// Get recommended action for the facility
    pub fn recommended_action(&self) -> &'static str {
        match self {
            RiskLevel::Low => "No action required",
            RiskLevel::Medium => "Review stock on hand at the next monthly report",
            RiskLevel::High => "Raise a resupply order and check pending deliveries",
            RiskLevel::Critical => "Request an emergency resupply or redistribution from nearby facilities",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability cut-offs for each risk band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Lower bound for medium (default: 0.50)
    pub medium: f64,
    /// Lower bound for high (default: 0.75)
    pub high: f64,
    /// Lower bound for critical (default: 0.90)
    pub critical: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: 0.5,
            high: 0.75,
            critical: 0.9,
        }
    }
}

impl RiskThresholds {
    /// Map p(stock-out) onto a risk band
    pub fn from_probability(&self, probability: f64) -> RiskLevel {
        if probability >= self.critical {
            RiskLevel::Critical
        } else if probability >= self.high {
            RiskLevel::High
        } else if probability >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_levels() {
        let thresholds = RiskThresholds::default();
        assert_eq!(thresholds.from_probability(0.95), RiskLevel::Critical);
        assert_eq!(thresholds.from_probability(0.9), RiskLevel::Critical);
        assert_eq!(thresholds.from_probability(0.8), RiskLevel::High);
        assert_eq!(thresholds.from_probability(0.5), RiskLevel::Medium);
        assert_eq!(thresholds.from_probability(0.1), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.76), RiskLevel::High);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = RiskThresholds {
            medium: 0.3,
            ..Default::default()
        };
        assert_eq!(thresholds.from_probability(0.35), RiskLevel::Medium);
    }

    #[test]
    fn test_ordering_and_names() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert_eq!(RiskLevel::High.to_string(), "high");
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"medium\"");
    }
}
