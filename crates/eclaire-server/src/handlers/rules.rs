//! Rule table handlers (transparency view)

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use eclaire_core::Rule;

#[derive(Debug, Serialize)]
pub struct RulesResponse {
    /// Override file the table came from, `null` for the built-in table
    pub source: Option<String>,
    pub rules: Vec<Rule>,
}

/// GET /api/rules - The loaded rule table, in table order
pub async fn list_rules(State(state): State<Arc<AppState>>) -> Json<RulesResponse> {
    let table = state.engine.rules();
    Json(RulesResponse {
        source: table.source().map(|p| p.display().to_string()),
        rules: table.rules().to_vec(),
    })
}
