//! HTTP adapters - REST API implementations.
//!
//! Each surface has its own module with dto/handlers/routes; `app_router`
//! merges them and adds the health check.

pub mod assistant;
pub mod error;
pub mod flows;

pub use assistant::{assistant_router, AssistantAppState};
pub use error::{ApiError, ErrorResponse};
pub use flows::{flows_router, FlowsAppState};

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// All routes, without middleware. `main` layers tracing, timeout and CORS on top.
pub fn app_router(assistant: AssistantAppState, flows: FlowsAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(assistant_router(assistant))
        .merge(flows_router(flows))
}
