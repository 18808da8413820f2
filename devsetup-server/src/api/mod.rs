//! API Module
//!
//! HTTP API layer for the server.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod install;
pub mod tool;
pub mod ws;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Tool catalog endpoints
        .route("/api/tools", get(tool::list_tools))
        .route("/api/tools/installed", get(tool::list_installed))
        .route("/api/tools/sets", get(tool::list_tool_sets))
        .route("/api/tools/{id}", get(tool::get_tool))
        // Installation endpoints
        .route("/api/install/tool", post(install::install_tools))
        .route("/api/install/toolset", post(install::install_tool_set))
        .route("/api/install/progress/{id}", get(install::get_progress))
        .route("/api/install/cancel/{id}", delete(install::cancel))
        .route("/api/install/active", get(install::list_active))
        .route("/api/install/events", get(ws::progress_events))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
