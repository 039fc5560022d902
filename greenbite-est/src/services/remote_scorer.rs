//! Remote sustainability scorer client
//!
//! Some deployments delegate dish scoring to a separate prediction service.
//! The request carries the dish total and the reply carries the score:
//!
//! ```text
//! POST <url>  {"total_land_to_retail": 120.68}
//! 200 OK      {"sustainability_score": 1.7}
//! ```
//!
//! Failures never escape this module. A transport failure (connect, timeout,
//! non-2xx) becomes [`DishScore::Error`]; a reply without a numeric score
//! becomes [`DishScore::NotAvailable`].

use greenbite_common::{Error, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::time::Duration;
use thiserror::Error as ThisError;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("greenbite-est/", env!("CARGO_PKG_VERSION"));

/// Request failures, collapsed into [`DishScore`] before leaving the module
#[derive(Debug, ThisError)]
enum ScorerError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Scorer returned HTTP {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct ScoreRequest {
    total_land_to_retail: f64,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    sustainability_score: Option<serde_json::Value>,
}

/// Score for one dish as reported by the remote service
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DishScore {
    Score(f64),
    /// Service replied without a usable score
    NotAvailable,
    /// Service could not be reached or answered with an error status
    Error,
}

impl Serialize for DishScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DishScore::Score(v) => serializer.serialize_f64(*v),
            DishScore::NotAvailable => serializer.serialize_str("N/A"),
            DishScore::Error => serializer.serialize_str("Error"),
        }
    }
}

/// HTTP client for the prediction service
pub struct RemoteScorer {
    http_client: reqwest::Client,
    url: String,
}

impl RemoteScorer {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build scorer client: {}", e)))?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }

    /// Ask the service to score a dish total
    pub async fn score(&self, total_land_to_retail: f64) -> DishScore {
        match self.request(total_land_to_retail).await {
            Ok(Some(score)) => {
                debug!(url = %self.url, total_land_to_retail, score, "Remote score received");
                DishScore::Score(score)
            }
            Ok(None) => {
                warn!(url = %self.url, "Remote scorer returned no numeric score");
                DishScore::NotAvailable
            }
            Err(ScorerError::InvalidResponse(msg)) => {
                warn!(url = %self.url, error = %msg, "Remote scorer response unreadable");
                DishScore::NotAvailable
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "Remote scoring failed");
                DishScore::Error
            }
        }
    }

    async fn request(&self, total_land_to_retail: f64) -> std::result::Result<Option<f64>, ScorerError> {
        let response = self
            .http_client
            .post(&self.url)
            .json(&ScoreRequest {
                total_land_to_retail,
            })
            .send()
            .await
            .map_err(|e| ScorerError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScorerError::Status(status.as_u16()));
        }

        let body: ScoreResponse = response
            .json()
            .await
            .map_err(|e| ScorerError::InvalidResponse(e.to_string()))?;

        Ok(body
            .sustainability_score
            .and_then(|v| v.as_f64())
            .filter(|v| v.is_finite()))
    }
}
