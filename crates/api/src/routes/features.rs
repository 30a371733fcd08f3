//! Feature Table Routes

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use feature_engine::{FeatureRecord, PipelineReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

/// Response encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

/// Query parameters for the features endpoint
#[derive(Debug, Deserialize)]
pub struct FeatureQuery {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Response for the features endpoint
#[derive(Debug, Serialize)]
pub struct FeatureResponse {
    pub data: Vec<FeatureRecord>,
    pub report: PipelineReport,
}

/// Build the feature table for an uploaded CSV ledger
pub async fn post_features(
    State(state): State<Arc<RwLock<AppState>>>,
    Query(params): Query<FeatureQuery>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let state = state.read().await;

    let ledger = ledger::read_ledger(&body[..], &state.columns)?;
    let table = state.pipeline.run(&ledger)?;
    info!(
        "Featurized upload: {} rows in, {} rows out",
        table.report.input_rows, table.report.output_rows
    );

    match params.format {
        OutputFormat::Json => Ok(Json(FeatureResponse {
            data: table.records,
            report: table.report,
        })
        .into_response()),
        OutputFormat::Csv => {
            let mut csv = Vec::new();
            table.write_csv(&mut csv)?;
            Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv).into_response())
        }
    }
}
