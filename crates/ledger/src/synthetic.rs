//! Synthetic Ledger Generation
//!
//! Produces monthly stock ledgers for a formulary of NCD drugs. `Clean`
//! ledgers model seasonality, growth, restocking and stock-outs; `Messy`
//! ledgers inject the data-quality faults seen in facility exports
//! (missing, outlier and negative consumption).

use crate::dates::month_starts;
use crate::record::LedgerRecord;
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Full formulary, tiers 1 to 3
pub const FORMULARY: &[&str] = &[
    "Amlodipine 5mg",
    "Lisinopril 10mg",
    "Metformin 500mg",
    "Atorvastatin 20mg",
    "Bendroflumethiazide 2.5mg",
    "Nifedipine 20mg",
    "Losartan 50mg",
    "Atenolol 50mg",
    "Glibenclamide 5mg",
    "Soluble Aspirin 75mg",
    "Methyldopa 250mg",
    "Hydralazine 25mg",
    "Insulin Mixtard",
    "Insulin Actrapid",
];

/// Oral formulary used for messy exports (no insulins)
pub const ORAL_FORMULARY: &[&str] = &[
    "Amlodipine 5mg",
    "Lisinopril 10mg",
    "Metformin 500mg",
    "Atorvastatin 20mg",
    "Bendroflumethiazide 2.5mg",
    "Nifedipine 20mg",
    "Losartan 50mg",
    "Atenolol 50mg",
    "Glibenclamide 5mg",
    "Soluble Aspirin 75mg",
    "Methyldopa 250mg",
    "Hydralazine 25mg",
];

/// Probability that a messy month has no consumption figure
const MISSING_RATE: f64 = 0.10;
/// Probability of a 10x data-entry outlier
const OUTLIER_RATE: f64 = 0.02;
/// Probability of a negative correction entry
const NEGATIVE_RATE: f64 = 0.01;
const NEGATIVE_CONSUMPTION: f64 = -50.0;

/// Kind of ledger to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorMode {
    /// Plausible ledger with seasonality and stock-outs
    Clean,
    /// Flat demand with injected data-quality faults
    Messy,
}

/// Generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub drugs: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub mode: GeneratorMode,
    /// RNG seed; identical seeds give identical ledgers
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            drugs: FORMULARY.iter().map(|d| d.to_string()).collect(),
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            mode: GeneratorMode::Clean,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    /// Messy export over the oral formulary
    pub fn messy() -> Self {
        Self {
            drugs: ORAL_FORMULARY.iter().map(|d| d.to_string()).collect(),
            mode: GeneratorMode::Messy,
            ..Default::default()
        }
    }
}

/// Seeded ledger generator
pub struct LedgerGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl LedgerGenerator {
    /// Create a generator
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    /// Generate one record per drug per month start in the configured range
    pub fn generate(&mut self) -> Vec<LedgerRecord> {
        let months = month_starts(self.config.start, self.config.end);
        info!(
            "Generating {:?} ledger for {} drugs over {} months",
            self.config.mode,
            self.config.drugs.len(),
            months.len()
        );

        let drugs = self.config.drugs.clone();
        let mut records = Vec::with_capacity(drugs.len() * months.len());
        for drug in &drugs {
            match self.config.mode {
                GeneratorMode::Clean => self.clean_series(drug, &months, &mut records),
                GeneratorMode::Messy => self.messy_series(drug, &months, &mut records),
            }
        }
        records
    }

    fn clean_series(&mut self, drug: &str, months: &[NaiveDate], out: &mut Vec<LedgerRecord>) {
        let start_year = self.config.start.year();
        let high_volume = drug.contains("Metformin") || drug.contains("Amlodipine");
        let base = if high_volume {
            self.rng.gen_range(500..2000) as f64
        } else {
            self.rng.gen_range(100..500) as f64
        };
        let mut opening = base * self.rng.gen_range(2.0..3.0);

        for &date in months {
            let month = date.month();
            let year_factor = 1.0 + (date.year() - start_year) as f64 * 0.05;
            let seasonal_factor =
                1.0 + (2.0 * std::f64::consts::PI * (month - 1) as f64 / 12.0).sin() * 0.1;
            let consumption =
                (base * year_factor * seasonal_factor * self.rng.gen_range(0.85..1.15)).trunc();

            let restock_every: u32 = if self.rng.gen_bool(0.5) { 2 } else { 3 };
            let received = if month % restock_every == 0 {
                (base * self.rng.gen_range(2.5..3.5)).trunc()
            } else {
                0.0
            };

            let losses = (opening * self.rng.gen_range(0.0..0.02)).trunc();
            let closing_pre = opening + received - consumption - losses;

            // Below roughly a week of cover
            let mut days_out = 0;
            if closing_pre < 0.25 * base && self.rng.gen_bool(0.6) {
                days_out = self.rng.gen_range(1..15);
            }
            let closing = closing_pre.max(0.0);

            out.push(LedgerRecord {
                date,
                drug: drug.to_string(),
                opening_balance: Some(opening.trunc()),
                quantity_received: Some(received),
                consumption: Some(consumption),
                losses_adjustments: Some(losses),
                closing_balance: Some(closing.trunc()),
                days_out_of_stock: Some(days_out),
            });
            opening = closing;
        }
    }

    fn messy_series(&mut self, drug: &str, months: &[NaiveDate], out: &mut Vec<LedgerRecord>) {
        let base = self.rng.gen_range(500..3000) as f64;
        let mut opening = base * 3.0;

        for &date in months {
            let mut consumption = Some((base * self.rng.gen_range(0.85..1.15)).trunc());
            let received = if date.month() % 3 == 0 {
                (base * 3.0).trunc()
            } else {
                0.0
            };
            let losses = (opening * self.rng.gen_range(0.0..0.02)).trunc();

            // Faults are mutually exclusive, checked in this order
            if self.rng.gen_bool(MISSING_RATE) {
                consumption = None;
            } else if self.rng.gen_bool(OUTLIER_RATE) {
                consumption = consumption.map(|c| c * 10.0);
            } else if self.rng.gen_bool(NEGATIVE_RATE) {
                consumption = Some(NEGATIVE_CONSUMPTION);
            }

            // Unknown consumption leaves stock unchanged apart from receipts and losses
            let closing = (opening + received - consumption.unwrap_or(0.0) - losses).max(0.0);

            out.push(LedgerRecord {
                date,
                drug: drug.to_string(),
                opening_balance: Some(opening.trunc()),
                quantity_received: Some(received),
                consumption,
                losses_adjustments: Some(losses),
                closing_balance: Some(closing.trunc()),
                days_out_of_stock: Some(0),
            });
            opening = closing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(mode: GeneratorMode) -> GeneratorConfig {
        GeneratorConfig {
            drugs: vec!["Metformin 500mg".to_string(), "Losartan 50mg".to_string()],
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
            mode,
            seed: 7,
        }
    }

    #[test]
    fn test_one_record_per_drug_per_month() {
        let records = LedgerGenerator::new(small_config(GeneratorMode::Clean)).generate();
        assert_eq!(records.len(), 2 * 24);
        assert!(records.iter().all(|r| r.date.day() == 1));
        assert_eq!(records.iter().filter(|r| r.drug == "Losartan 50mg").count(), 24);
    }

    #[test]
    fn test_clean_balances_chain() {
        let records = LedgerGenerator::new(small_config(GeneratorMode::Clean)).generate();
        for pair in records.windows(2) {
            if pair[0].drug == pair[1].drug {
                assert_eq!(pair[1].opening_balance, pair[0].closing_balance);
            }
        }
        assert!(records.iter().all(|r| r.closing_balance.unwrap() >= 0.0));
        assert!(records.iter().all(|r| r.consumption.is_some()));
    }

    #[test]
    fn test_seed_is_deterministic() {
        let a = LedgerGenerator::new(small_config(GeneratorMode::Messy)).generate();
        let b = LedgerGenerator::new(small_config(GeneratorMode::Messy)).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_messy_ledger_has_missing_consumption() {
        let config = GeneratorConfig {
            seed: 11,
            ..GeneratorConfig::messy()
        };
        let records = LedgerGenerator::new(config).generate();
        assert_eq!(records.len(), ORAL_FORMULARY.len() * 60);

        let missing = records.iter().filter(|r| r.consumption.is_none()).count();
        // ~10% of 720 rows
        assert!(missing > 20 && missing < 150, "missing = {missing}");
        assert!(records.iter().all(|r| r.days_out_of_stock == Some(0)));
    }
}
