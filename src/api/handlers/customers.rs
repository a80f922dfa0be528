//! Customer handlers

use super::run_blocking;
use crate::api::error::{AppError, AppResult};
use crate::api::views::CustomerView;
use crate::api::AppState;
use crate::types::customer::NewCustomer;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

/// List every stored customer with its current assessment
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<CustomerView>>> {
    let views = run_blocking(move || {
        let mut rng = rand::thread_rng();
        state
            .store
            .list_all()
            .iter()
            .map(|customer| {
                let assessment = state.predictor.predict_with_fallback(&customer.attributes);
                CustomerView::build(customer, &assessment, &mut rng)
            })
            .collect::<Vec<_>>()
    })
    .await?;

    info!(count = views.len(), "Customers listed");
    Ok(Json(views))
}

/// Get single customer
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<CustomerView>> {
    let customer = state
        .store
        .get(id)
        .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;

    let view = run_blocking(move || {
        let assessment = state.predictor.predict_with_fallback(&customer.attributes);
        CustomerView::build(&customer, &assessment, &mut rand::thread_rng())
    })
    .await?;

    Ok(Json(view))
}

/// Add a customer to the store
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewCustomer>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CustomerView>)> {
    let Json(new_customer) = payload?;

    let view = run_blocking(move || {
        let record = state.store.append(new_customer);
        let assessment = state.predictor.predict_with_fallback(&record.attributes);
        CustomerView::build(&record, &assessment, &mut rand::thread_rng())
    })
    .await?;

    Ok((StatusCode::CREATED, Json(view)))
}
