//! Direct scoring handlers. These surface every failure to the caller.

use super::run_blocking;
use crate::api::error::{AppError, AppResult};
use crate::api::views::PredictionResponse;
use crate::api::AppState;
use crate::batch::score_csv;
use crate::types::customer::{CustomerAttributes, CustomerData};
use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use tracing::info;

const UPLOAD_FIELD: &str = "file";
const RESULT_FILENAME: &str = "predictions.csv";

fn ensure_model_loaded(state: &AppState) -> AppResult<()> {
    if state.predictor.is_classifier_available() {
        Ok(())
    } else {
        Err(AppError::ServiceUnavailable("Model not loaded".to_string()))
    }
}

/// Score one customer
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<CustomerData>, JsonRejection>,
) -> AppResult<Json<PredictionResponse>> {
    ensure_model_loaded(&state)?;
    let Json(data) = payload?;

    let predictor = state.predictor.clone();
    let assessment =
        run_blocking(move || predictor.predict_one(&CustomerAttributes::from(data))).await??;

    info!(
        probability = assessment.probability,
        tier = %assessment.tier,
        "Prediction served"
    );
    Ok(Json(assessment.into()))
}

/// Score an uploaded CSV and return it with the result columns appended
pub async fn predict_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    ensure_model_loaded(&state)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(e.body_text()))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(e.body_text()))?;
            upload = Some(bytes);
            break;
        }
    }
    let upload = upload.ok_or_else(|| {
        AppError::InvalidInput(format!("missing multipart field `{}`", UPLOAD_FIELD))
    })?;

    let predictor = state.predictor.clone();
    let outcome = run_blocking(move || score_csv(&predictor, &upload)).await??;

    info!(
        rows = outcome.rows,
        failed = outcome.failed,
        "CSV predictions served"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", RESULT_FILENAME),
            ),
        ],
        outcome.csv,
    ))
}
