//! NCD Stock-Out API Server
//!
//! REST API over the feature pipeline, the stock-out classifier and the
//! dose log, plus the logging and metrics setup shared with the CLI.

use anyhow::Context;
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use feature_engine::FeaturePipeline;
use inference_engine::{InferenceEngine, InferenceError};
use ledger::ColumnMapping;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod config;
pub mod error;
pub mod rate_limit;
mod routes;

use crate::config::{AppConfig, LoggingConfig};
use crate::rate_limit::create_governor_config;

/// Application state shared across handlers
pub struct AppState {
    /// Stock-out classifier
    pub engine: InferenceEngine,
    /// Feature pipeline for uploaded ledgers
    pub pipeline: FeaturePipeline,
    /// Header names expected in uploaded ledgers
    pub columns: ColumnMapping,
    /// Prometheus handle, present once the recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create application state from configuration
    pub fn new(config: &AppConfig) -> Result<Self, InferenceError> {
        let engine = InferenceEngine::from_model_path(config.model.path.as_deref())?
            .with_thresholds(config.model.risk);

        Ok(Self {
            engine,
            pipeline: FeaturePipeline::new(config.pipeline),
            columns: config.columns.clone(),
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        })
    }

    /// Attach the Prometheus handle served at `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_features: usize,
}

/// Create the application router
pub fn create_router(state: Arc<RwLock<AppState>>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/features", post(routes::features::post_features))
        .route("/api/v1/predictions", post(routes::predictions::post_prediction))
        .route("/api/v1/doses", post(routes::doses::post_dose))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<RwLock<AppState>>>) -> impl IntoResponse {
    let state = state.read().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().timestamp(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model_features: state.engine.feature_names().len(),
    })
}

/// Prometheus scrape handler
async fn metrics_handler(State(state): State<Arc<RwLock<AppState>>>) -> impl IntoResponse {
    let state = state.read().await;
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// Initialize logging
///
/// `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {}", e))
}

/// Run the server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let recorder = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install metrics recorder")?;
    let state = AppState::new(&config)?.with_metrics(recorder);
    let governor = create_governor_config(&config.rate_limit)?;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any);

    let app = create_router(Arc::new(RwLock::new(state)))
        .layer(GovernorLayer { config: governor })
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.addr))?;
    info!("Starting API server on {}", config.server.addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
