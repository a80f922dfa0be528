use axum::{body::Body, http::Request, Router};
use delinquency_risk::{
    api::{create_router, AppState},
    config::AppConfig,
    metrics::PredictionMetrics,
    models::{Classifier, RiskClassifier},
    predictor::RiskPredictor,
    store::{CustomerStore, InMemoryCustomerStore},
    FeatureVector,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Probability rises with the average payment delay
pub struct DelayModel;

impl Classifier for DelayModel {
    fn name(&self) -> &str {
        "delay"
    }

    fn predict_probability(&self, features: &FeatureVector) -> anyhow::Result<f64> {
        Ok((0.2 + features.avg_delay * 0.25).clamp(0.0, 1.0))
    }
}

pub fn app_with(classifier: RiskClassifier, store: InMemoryCustomerStore) -> Router {
    let predictor = Arc::new(RiskPredictor::new(
        classifier,
        Arc::new(PredictionMetrics::new()),
    ));
    let store: Arc<dyn CustomerStore> = Arc::new(store);
    create_router(AppState::new(
        predictor,
        store,
        Arc::new(AppConfig::default()),
    ))
}

pub fn scoring_app() -> Router {
    app_with(
        RiskClassifier::from_model(DelayModel),
        InMemoryCustomerStore::seeded(),
    )
}

pub fn unavailable_app() -> Router {
    app_with(
        RiskClassifier::unavailable("model file not found"),
        InMemoryCustomerStore::seeded(),
    )
}

pub async fn send(app: Router, request: Request<Body>) -> (u16, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

pub async fn get_json(app: Router, uri: &str) -> (u16, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> (u16, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Rohan Sharma's attributes in wire form
pub fn rohan() -> Value {
    serde_json::json!({
        "limit_bal": 200000.0, "sex": 2, "education": 2, "marriage": 1, "age": 35,
        "pay_0": 0, "pay_2": 0, "pay_3": 1, "pay_4": 0, "pay_5": 0, "pay_6": 0,
        "bill_amt1": 50000.0, "bill_amt2": 48000.0, "bill_amt3": 47000.0,
        "bill_amt4": 46000.0, "bill_amt5": 45000.0, "bill_amt6": 44000.0,
        "pay_amt1": 5000.0, "pay_amt2": 6000.0, "pay_amt3": 7000.0,
        "pay_amt4": 6000.0, "pay_amt5": 6000.0, "pay_amt6": 8000.0
    })
}
