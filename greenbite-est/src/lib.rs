//! greenbite-est library interface
//!
//! Dish carbon-footprint estimation service: resolves a dish to recipes,
//! matches ingredients to the emissions reference table, and aggregates the
//! result into a total, a sustainability score and everyday equivalences.

pub mod api;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod services;

pub use crate::error::{ApiError, ApiResult};
pub use crate::pipeline::{EmissionsReport, Pipeline, RecipeCandidate};

use axum::Router;
use chrono::{DateTime, Utc};
use services::remote_scorer::RemoteScorer;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    /// Replaces the local sustainability score when configured
    pub remote_scorer: Option<Arc<RemoteScorer>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            remote_scorer: None,
            startup_time: Utc::now(),
        }
    }

    pub fn with_remote_scorer(mut self, scorer: RemoteScorer) -> Self {
        self.remote_scorer = Some(Arc::new(scorer));
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::search_routes())
        .merge(api::emissions_routes())
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
