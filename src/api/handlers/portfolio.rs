//! Portfolio-wide views: dashboard, analytics and service metrics

use super::run_blocking;
use crate::api::error::{AppError, AppResult};
use crate::api::AppState;
use crate::dashboard::{DashboardMetrics, PortfolioScores, RiskSummary};
use crate::metrics::MetricsSnapshot;
use axum::{extract::State, Json};

async fn collect_scores(state: AppState) -> AppResult<PortfolioScores> {
    run_blocking(move || PortfolioScores::collect(&state.predictor, state.store.as_ref())).await
}

pub async fn dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardMetrics>> {
    let scores = collect_scores(state).await?;
    Ok(Json(DashboardMetrics::from_scores(&scores)))
}

pub async fn risk_summary(State(state): State<AppState>) -> AppResult<Json<RiskSummary>> {
    let scores = collect_scores(state).await?;
    RiskSummary::from_scores(&scores)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No customers".to_string()))
}

pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.predictor.metrics().snapshot())
}
