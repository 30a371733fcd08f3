//! API Error Responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use feature_engine::FeatureError;
use inference_engine::InferenceError;
use ledger::LedgerError;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Message returned for any rejected ledger upload
pub const UNPROCESSABLE_INPUT: &str = "input data could not be processed";

/// Errors surfaced by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Pipeline(#[from] FeatureError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Ledger details stay in the server log
        let (status, message) = match &self {
            ApiError::Ledger(_) | ApiError::Pipeline(_) => {
                warn!("Rejected ledger: {}", self);
                (StatusCode::UNPROCESSABLE_ENTITY, UNPROCESSABLE_INPUT.to_string())
            }
            ApiError::Inference(e @ InferenceError::MissingFeature(_))
            | ApiError::Inference(e @ InferenceError::InvalidInputShape { .. })
            | ApiError::Inference(e @ InferenceError::FeatureOrderMismatch { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ApiError::Inference(e) => {
                warn!("Inference failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "inference failed".to_string())
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
