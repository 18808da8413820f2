//! Health Check API Handler
//!
//! Liveness endpoint for monitoring; also reports how many batches are running.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /health
/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "active_batches": state.installer.registry().len(),
    }))
}
