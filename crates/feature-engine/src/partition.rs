//! Per-Drug Partitioning

use chrono::NaiveDate;
use ledger::LedgerRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// More than one record shares a (drug, date) key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateKeyWarning {
    pub drug: String,
    pub date: NaiveDate,
    /// Number of records sharing the key
    pub count: usize,
}

/// Ledger records grouped by drug, each group in ascending date order
///
/// Groups are keyed in lexicographic drug order. Within a group the sort is
/// stable, so records with the same date keep their input order.
#[derive(Debug, Clone, Default)]
pub struct DrugPartitions {
    groups: BTreeMap<String, Vec<LedgerRecord>>,
    duplicates: Vec<DuplicateKeyWarning>,
}

impl DrugPartitions {
    /// Partition records by drug and order each partition by date
    pub fn from_records(records: Vec<LedgerRecord>) -> Self {
        let mut groups: BTreeMap<String, Vec<LedgerRecord>> = BTreeMap::new();
        for record in records {
            groups.entry(record.drug.clone()).or_default().push(record);
        }

        let mut duplicates = Vec::new();
        for (drug, series) in groups.iter_mut() {
            series.sort_by_key(|r| r.date);
            duplicates.extend(find_duplicates(drug, series));
        }

        for dup in &duplicates {
            warn!(
                "Duplicate ledger key: {} on {} appears {} times",
                dup.drug, dup.date, dup.count
            );
        }

        Self { groups, duplicates }
    }

    /// Number of distinct drugs
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no records at all
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Duplicate (drug, date) keys found while partitioning
    pub fn duplicates(&self) -> &[DuplicateKeyWarning] {
        &self.duplicates
    }

    /// Consume into (drug, series) pairs in drug order
    pub fn into_series(self) -> impl Iterator<Item = (String, Vec<LedgerRecord>)> {
        self.groups.into_iter()
    }
}

fn find_duplicates(drug: &str, series: &[LedgerRecord]) -> Vec<DuplicateKeyWarning> {
    let mut found = Vec::new();
    let mut i = 0;
    while i < series.len() {
        let run = series[i..]
            .iter()
            .take_while(|r| r.date == series[i].date)
            .count();
        if run > 1 {
            found.push(DuplicateKeyWarning {
                drug: drug.to_string(),
                date: series[i].date,
                count: run,
            });
        }
        i += run;
    }
    found
}
