//! HTTP API handlers for greenbite-est

pub mod emissions;
pub mod health;
pub mod search;

pub use emissions::emissions_routes;
pub use health::health_routes;
pub use search::search_routes;

use crate::error::{ApiError, ApiResult};

/// Run CPU-bound pipeline work off the async executor
pub(crate) async fn run_blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> greenbite_common::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("Pipeline task failed: {}", e)))?
        .map_err(ApiError::from)
}
