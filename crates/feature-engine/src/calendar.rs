//! Calendar Features

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Month, year and quarter of a ledger date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFeatures {
    /// 1..=12
    pub month: u32,
    pub year: i32,
    /// 1..=4
    pub quarter: u32,
}

impl CalendarFeatures {
    /// Derive calendar features from a date
    pub fn from_date(date: NaiveDate) -> Self {
        let month = date.month();
        Self {
            month,
            year: date.year(),
            quarter: (month + 2) / 3,
        }
    }
}
