//! HTTP routes for assistant endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{ask_assistant, ask_patient_assistant, list_tools, AssistantAppState};

pub fn assistant_router(state: AssistantAppState) -> Router {
    Router::new()
        .route("/api/assistant", post(ask_assistant))
        .route("/api/assistant/tools", get(list_tools))
        .route("/api/patient/assistant", post(ask_patient_assistant))
        .with_state(state)
}
