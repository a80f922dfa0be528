//! HTTP API for the risk scoring service

pub mod error;
pub mod handlers;
pub mod views;

use crate::config::AppConfig;
use crate::predictor::RiskPredictor;
use crate::store::CustomerStore;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<RiskPredictor>,
    pub store: Arc<dyn CustomerStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        predictor: Arc<RiskPredictor>,
        store: Arc<dyn CustomerStore>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            predictor,
            store,
            config,
        }
    }
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        // Customers
        .route(
            "/customers",
            get(handlers::customers::list).post(handlers::customers::create),
        )
        .route("/customers/:id", get(handlers::customers::get))
        // Scoring
        .route("/predict", post(handlers::predict::predict))
        .route("/predict_csv", post(handlers::predict::predict_csv))
        // Portfolio
        .route("/dashboard-metrics", get(handlers::portfolio::dashboard))
        .route("/analytics/risk-summary", get(handlers::portfolio::risk_summary))
        .route("/metrics", get(handlers::portfolio::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
