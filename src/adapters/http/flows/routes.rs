//! HTTP routes for prompt flow endpoints.

use axum::routing::post;
use axum::Router;

use super::handlers::{reminder, suggestions, summarize, FlowsAppState};

pub fn flows_router(state: FlowsAppState) -> Router {
    Router::new()
        .route("/api/flows/summarize", post(summarize))
        .route("/api/flows/reminder", post(reminder))
        .route("/api/flows/suggestions", post(suggestions))
        .with_state(state)
}
