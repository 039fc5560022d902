//! POST /search: dish name to candidate recipes

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::pipeline::RecipeCandidate;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub dish: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub recipes: Vec<RecipeCandidate>,
}

/// POST /search
///
/// `{"dish": "chicken biryani"}` → `{"recipes": [{"title", "ingredients"}]}`.
/// No match is an empty list, not an error.
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Json(request) = payload?;
    let dish = request
        .dish
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("No dish name provided".to_string()))?;

    tracing::info!(dish = %dish, "Searching recipes");

    let pipeline = state.pipeline.clone();
    let recipes = super::run_blocking(move || pipeline.search(&dish)).await?;

    Ok(Json(SearchResponse { recipes }))
}

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/search", post(search))
}
