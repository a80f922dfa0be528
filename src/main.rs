//! Pre-delinquency Risk API - Main Entry Point
//!
//! Loads the classifier, seeds the customer store and serves the HTTP API.
//! A missing or invalid model does not stop the service: scoring endpoints
//! answer 503 and portfolio views fall back to the default assessment.

use anyhow::{Context, Result};
use delinquency_risk::{
    api::{create_router, AppState},
    config::{AppConfig, LoggingConfig},
    feature_extractor::FeatureExtractor,
    metrics::{MetricsReporter, PredictionMetrics},
    models::RiskClassifier,
    predictor::RiskPredictor,
    store::{CustomerStore, InMemoryCustomerStore},
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    init_tracing(&config.logging)?;

    info!("Starting Pre-delinquency Risk API");
    info!(
        environment = %config.server.environment,
        model_path = %config.model.path,
        "Configuration loaded successfully"
    );

    // Initialize metrics
    let metrics = Arc::new(PredictionMetrics::new());

    info!(
        "Feature extractor initialized ({} features)",
        FeatureExtractor::new().feature_count()
    );

    // Load classifier; failure leaves it unavailable for the process lifetime
    let classifier = RiskClassifier::load(&config.model);
    match classifier.model_name() {
        Some(name) => info!(model = %name, "Classifier loaded"),
        None => warn!(
            reason = classifier.unavailable_reason().unwrap_or("unknown"),
            "Serving without a classifier"
        ),
    }

    let predictor = Arc::new(RiskPredictor::new(classifier, metrics.clone()));
    let store: Arc<dyn CustomerStore> = Arc::new(InMemoryCustomerStore::seeded());
    info!(customers = store.list_all().len(), "Customer store seeded");

    // Start metrics reporter
    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(async move {
            reporter.start().await;
        });
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(predictor, store, Arc::new(config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    info!("Server shutting down...");
    metrics.print_summary();

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{},tower_http=info", logging.level)))
        .context("Invalid log level")?;

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    Ok(())
}
