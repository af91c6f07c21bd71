//! Analysis and scenario handlers

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use tracing::debug;

use super::rejected;
use crate::{AppError, AppState};
use eclaire_core::{
    fingerprint, Adjustment, AnalysisRequest, AnalysisResult, FinancialSnapshot,
    ScenarioOutcome, UserProfile,
};

/// Request body for analyzing a full expense ledger
#[derive(Debug, Deserialize)]
pub struct LedgerRequest {
    pub snapshot: FinancialSnapshot,
    #[serde(default)]
    pub profile: UserProfile,
}

/// Request body for a what-if adjustment
#[derive(Debug, Deserialize)]
pub struct ScenarioRequest {
    pub snapshot: FinancialSnapshot,
    #[serde(default)]
    pub profile: UserProfile,
    pub adjustment: Adjustment,
}

/// Serve from the cache or run the engine and remember the result
async fn analyze_cached(
    state: &AppState,
    snapshot: &FinancialSnapshot,
    profile: &UserProfile,
) -> Result<AnalysisResult, AppError> {
    let key = fingerprint(snapshot, profile);
    if let Some(hit) = state.cache.get(&key).await {
        debug!(fingerprint = %key, "Analysis cache hit");
        return Ok(hit.as_ref().clone());
    }

    let result = state.engine.analyze(snapshot, profile)?;
    state.cache.insert(key, Arc::new(result.clone())).await;
    Ok(result)
}

/// POST /api/analyze - Analyze a summary request
///
/// Monthly totals plus the discretionary share, as sent by the overview screen.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let Json(request) = payload.map_err(rejected)?;
    let snapshot = request.to_snapshot()?;
    let result = analyze_cached(&state, &snapshot, &request.profile).await?;
    Ok(Json(result))
}

/// POST /api/analyze/ledger - Analyze a full expense ledger
pub async fn analyze_ledger(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LedgerRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let Json(request) = payload.map_err(rejected)?;
    let result = analyze_cached(&state, &request.snapshot, &request.profile).await?;
    Ok(Json(result))
}

/// POST /api/scenario - Evaluate one slider position or simulator input
pub async fn evaluate_scenario(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ScenarioRequest>, JsonRejection>,
) -> Result<Json<ScenarioOutcome>, AppError> {
    let Json(request) = payload.map_err(rejected)?;
    let ScenarioRequest {
        snapshot,
        profile,
        adjustment,
    } = request;
    let outcome = state
        .engine
        .evaluate_scenario(&snapshot, &profile, &adjustment)?;
    Ok(Json(outcome))
}
