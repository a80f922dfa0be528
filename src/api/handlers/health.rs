//! Service status handlers

use crate::api::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct StatusResponse {
    message: &'static str,
    status: &'static str,
    model_loaded: bool,
    cors_origins: Vec<String>,
    environment: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    cors_configured: bool,
    allowed_origins: Vec<String>,
    version: &'static str,
}

pub async fn root(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Pre-delinquency API",
        status: "running",
        model_loaded: state.predictor.is_classifier_available(),
        cors_origins: state.config.server.cors_origins.clone(),
        environment: state.config.server.environment.clone(),
    })
}

/// Always healthy; model availability is reported, not enforced
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model_loaded: state.predictor.is_classifier_available(),
        cors_configured: true,
        allowed_origins: state.config.server.cors_origins.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
