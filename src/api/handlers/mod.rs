//! HTTP handlers

pub mod customers;
pub mod health;
pub mod portfolio;
pub mod predict;

use crate::api::error::{AppError, AppResult};

/// Run scoring work off the async runtime; the classifier session is
/// synchronous and serialized behind a lock.
pub(crate) async fn run_blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("scoring task failed: {}", e)))
}
