//! Sustainability score on a 1.0 (worst) to 5.0 (best) scale
//!
//! Two policies exist and a deployment runs exactly one of them, selected by
//! `scoring.policy` in the TOML config:
//!
//! - **Step** (default): fixed bands of dish emissions, half-point steps
//! - **Linear**: straight line from 5.0 at 0.1 kg CO2e down to 1.0 at 10 kg
//!
//! Both return 5.0 for a missing or non-positive total and 3.0 for NaN.

pub use greenbite_common::config::ScoringPolicy;

/// Score when the total could not be computed
pub const NON_NUMERIC_SCORE: f64 = 3.0;
pub const BEST_SCORE: f64 = 5.0;
pub const WORST_SCORE: f64 = 1.0;

/// Upper band edges (inclusive) and their scores
const STEP_BANDS: [(f64, f64); 7] = [
    (1.0, 5.0),
    (3.0, 4.5),
    (6.0, 4.0),
    (10.0, 3.5),
    (15.0, 3.0),
    (25.0, 2.5),
    (40.0, 2.0),
];

const LINEAR_LOW_KG: f64 = 0.1;
const LINEAR_HIGH_KG: f64 = 10.0;

/// Score a dish total under the given policy
pub fn score(policy: ScoringPolicy, total_emissions: Option<f64>) -> f64 {
    match policy {
        ScoringPolicy::Step => step_score(total_emissions),
        ScoringPolicy::Linear => linear_score(total_emissions),
    }
}

pub fn step_score(total_emissions: Option<f64>) -> f64 {
    let Some(total) = total_emissions else {
        return BEST_SCORE;
    };
    if total.is_nan() {
        return NON_NUMERIC_SCORE;
    }
    if total <= 0.0 {
        return BEST_SCORE;
    }
    STEP_BANDS
        .iter()
        .find(|(upper, _)| total <= *upper)
        .map(|(_, s)| *s)
        .unwrap_or(WORST_SCORE)
}

pub fn linear_score(total_emissions: Option<f64>) -> f64 {
    let Some(total) = total_emissions else {
        return BEST_SCORE;
    };
    if total.is_nan() {
        return NON_NUMERIC_SCORE;
    }
    if total <= LINEAR_LOW_KG {
        return BEST_SCORE;
    }
    if total >= LINEAR_HIGH_KG {
        return WORST_SCORE;
    }
    let fraction = (total - LINEAR_LOW_KG) / (LINEAR_HIGH_KG - LINEAR_LOW_KG);
    let raw = BEST_SCORE - fraction * (BEST_SCORE - WORST_SCORE);
    (raw * 10.0).round() / 10.0
}
