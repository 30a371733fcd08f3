//! Dose Log Implementation

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Shown in place of the history when nothing has been logged
pub const EMPTY_LOG_MESSAGE: &str = "You have not logged any doses yet.";

const CONFIRMATION_FORMAT: &str = "%I:%M %p on %A, %B %d";
const HISTORY_FORMAT: &str = "%A, %B %d, %Y at %I:%M:%S %p";

/// A single logged dose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseEntry {
    /// Local time the dose was taken
    pub taken_at: NaiveDateTime,
}

impl DoseEntry {
    pub fn new(taken_at: NaiveDateTime) -> Self {
        Self { taken_at }
    }

    /// e.g. "Dose logged successfully at 09:05 AM on Monday, March 04"
    pub fn confirmation(&self) -> String {
        format!(
            "Dose logged successfully at {}",
            self.taken_at.format(CONFIRMATION_FORMAT)
        )
    }

    /// e.g. "Monday, March 04, 2024 at 09:05:00 AM"
    pub fn history_line(&self) -> String {
        self.taken_at.format(HISTORY_FORMAT).to_string()
    }
}

/// Logged doses, most recently logged first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoseLog {
    entries: Vec<DoseEntry>,
}

impl DoseLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[DoseEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recently logged dose
    pub fn latest(&self) -> Option<&DoseEntry> {
        self.entries.first()
    }

    /// One formatted line per dose, newest first
    pub fn history(&self) -> Vec<String> {
        self.entries.iter().map(DoseEntry::history_line).collect()
    }

    /// History as display text, or [`EMPTY_LOG_MESSAGE`] for an empty log
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return EMPTY_LOG_MESSAGE.to_string();
        }
        self.entries
            .iter()
            .map(|entry| format!("- {}", entry.history_line()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<DoseEntry>> for DoseLog {
    fn from(entries: Vec<DoseEntry>) -> Self {
        Self { entries }
    }
}

/// Record a dose taken at `taken_at`
///
/// Returns the extended log and the new entry. Existing entries are kept
/// unchanged and in order; the new entry goes to the front.
pub fn log_dose(log: DoseLog, taken_at: NaiveDateTime) -> (DoseLog, DoseEntry) {
    let entry = DoseEntry::new(taken_at);
    let mut entries = Vec::with_capacity(log.entries.len() + 1);
    entries.push(entry);
    entries.extend(log.entries);

    info!("Dose logged at {} ({} total)", taken_at, entries.len());
    metrics::counter!("doses_logged_total").increment(1);

    (DoseLog { entries }, entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .unwrap()
    }

    #[test]
    fn test_empty_log() {
        let log = DoseLog::new();
        assert!(log.is_empty());
        assert!(log.latest().is_none());
        assert_eq!(log.render(), EMPTY_LOG_MESSAGE);
    }

    #[test]
    fn test_confirmation_message() {
        let (_, entry) = log_dose(DoseLog::new(), at(4, 9, 5));
        assert_eq!(
            entry.confirmation(),
            "Dose logged successfully at 09:05 AM on Monday, March 04"
        );
    }

    #[test]
    fn test_history_line() {
        let entry = DoseEntry::new(at(4, 21, 30));
        assert_eq!(entry.history_line(), "Monday, March 04, 2024 at 09:30:00 PM");
    }

    #[test]
    fn test_newest_first_and_prior_entries_unchanged() {
        let (log, first) = log_dose(DoseLog::new(), at(4, 9, 5));
        let before = log.clone();
        let (log, second) = log_dose(log, at(5, 8, 55));

        assert_eq!(log.len(), 2);
        assert_eq!(log.latest(), Some(&second));
        assert_eq!(log.entries()[1], first);
        assert_eq!(&log.entries()[1..], before.entries());
        assert_eq!(
            log.render(),
            "- Tuesday, March 05, 2024 at 08:55:00 AM\n- Monday, March 04, 2024 at 09:05:00 AM"
        );
    }

    #[test]
    fn test_serializes_as_list() {
        let (log, _) = log_dose(DoseLog::new(), at(4, 9, 5));
        let json = serde_json::to_string(&log).unwrap();
        assert_eq!(json, r#"[{"taken_at":"2024-03-04T09:05:00"}]"#);

        let back: DoseLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log);
    }
}
