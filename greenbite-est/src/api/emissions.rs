//! POST /emissions: ingredient list to emissions report

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::pipeline::EmissionsReport;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EmissionsRequest {
    /// Kept loose so a non-list value is a 400 with a clear message
    pub ingredients: Option<Value>,
}

/// Accept only a non-empty array of strings
fn ingredient_list(value: Option<Value>) -> ApiResult<Vec<String>> {
    let invalid = || ApiError::BadRequest("No valid ingredients provided".to_string());
    let Some(Value::Array(items)) = value else {
        return Err(invalid());
    };
    if items.is_empty() {
        return Err(invalid());
    }
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            _ => Err(invalid()),
        })
        .collect()
}

/// POST /emissions
///
/// With a remote scorer configured, its answer replaces the local score.
pub async fn emissions(
    State(state): State<AppState>,
    payload: Result<Json<EmissionsRequest>, JsonRejection>,
) -> ApiResult<Json<EmissionsReport>> {
    let Json(request) = payload?;
    let ingredients = ingredient_list(request.ingredients)?;

    tracing::info!(count = ingredients.len(), "Estimating emissions");

    let pipeline = state.pipeline.clone();
    let mut report = super::run_blocking(move || pipeline.estimate(ingredients.as_slice())).await?;

    if let Some(scorer) = &state.remote_scorer {
        report.sustainability_score = scorer.score(report.totals.total_emissions()).await;
    }

    Ok(Json(report))
}

pub fn emissions_routes() -> Router<AppState> {
    Router::new().route("/emissions", post(emissions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ingredient_list_validation() {
        assert_eq!(
            ingredient_list(Some(json!(["beef", "cheese"]))).unwrap(),
            vec!["beef", "cheese"]
        );
        assert!(ingredient_list(None).is_err());
        assert!(ingredient_list(Some(json!([]))).is_err());
        assert!(ingredient_list(Some(json!("beef"))).is_err());
        assert!(ingredient_list(Some(json!(["beef", 3]))).is_err());
    }
}
