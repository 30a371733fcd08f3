//! Dose Log Routes
//!
//! The server keeps no dose history: clients send their log and store the
//! one returned.

use axum::Json;
use chrono::NaiveDateTime;
use dose_log::{log_dose, DoseEntry, DoseLog};
use serde::{Deserialize, Serialize};

/// Request body for the doses endpoint
#[derive(Debug, Deserialize)]
pub struct DoseRequest {
    #[serde(default)]
    pub log: DoseLog,
    /// Defaults to the server's local time
    pub taken_at: Option<NaiveDateTime>,
}

/// Response for the doses endpoint
#[derive(Debug, Serialize)]
pub struct DoseResponse {
    pub log: DoseLog,
    pub entry: DoseEntry,
    pub message: String,
    /// Formatted history, newest first
    pub history: Vec<String>,
}

/// Append a dose to the caller's log
pub async fn post_dose(Json(request): Json<DoseRequest>) -> Json<DoseResponse> {
    let taken_at = request
        .taken_at
        .unwrap_or_else(|| chrono::Local::now().naive_local());
    let (log, entry) = log_dose(request.log, taken_at);

    Json(DoseResponse {
        message: entry.confirmation(),
        history: log.history(),
        log,
        entry,
    })
}
