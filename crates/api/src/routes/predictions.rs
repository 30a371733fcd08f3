//! Prediction Routes

use axum::{extract::State, Json};
use inference_engine::{Attribution, RiskLevel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::ApiError;
use crate::AppState;

/// Request body for the predictions endpoint
#[derive(Debug, Deserialize)]
pub struct PredictionRequest {
    /// Feature name → value; names match the model's columns case-insensitively
    pub features: HashMap<String, f64>,
}

/// Response for the predictions endpoint
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    /// 1 = stock-out expected
    pub prediction: u8,
    pub probabilities: [f64; 2],
    pub risk_level: RiskLevel,
    pub recommended_action: &'static str,
    /// Log-odds before any feature contribution
    pub base_value: f64,
    /// Ranked by absolute contribution
    pub attributions: Vec<Attribution>,
}

/// Predict stock-out risk for one drug-month
pub async fn post_prediction(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let state = state.read().await;
    let prediction = state.engine.predict_features(&request.features)?;

    let attributions = prediction
        .explanation
        .ranked()
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(PredictionResponse {
        prediction: prediction.label,
        probabilities: prediction.probabilities,
        risk_level: prediction.risk,
        recommended_action: prediction.risk.recommended_action(),
        base_value: prediction.explanation.base_value,
        attributions,
    }))
}
