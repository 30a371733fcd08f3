//! Lag and Rolling-Window Statistics over a time-ordered series
//!
//! Values are `Option<f64>`; `None` marks a month whose consumption was not
//! recorded. Both operations only look backwards and never cross the slice
//! they are given, so callers pass one drug's series at a time.

use serde::{Deserialize, Serialize};

/// How a missing value inside a rolling window is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Exclude missing values from the mean; undefined only when fewer than
    /// `min_periods` values are present
    #[default]
    Skip,
    /// Any missing value makes the window's mean undefined
    Propagate,
}

/// Shift a series forward by `periods` positions
pub fn lag(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i >= periods {
                values[i - periods]
            } else {
                None
            }
        })
        .collect()
}

/// Trailing mean over positions `i + 1 - window ..= i` (clamped at the series start)
pub fn rolling_mean(
    values: &[Option<f64>],
    window: usize,
    min_periods: usize,
    policy: MissingValuePolicy,
) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            window_mean(&values[start..=i], min_periods, policy)
        })
        .collect()
}

fn window_mean(slice: &[Option<f64>], min_periods: usize, policy: MissingValuePolicy) -> Option<f64> {
    if policy == MissingValuePolicy::Propagate && slice.iter().any(Option::is_none) {
        return None;
    }

    let (sum, count) = slice
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 || count < min_periods {
        None
    } else {
        Some(sum / count as f64)
    }
}
