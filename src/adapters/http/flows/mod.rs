//! Prompt flow HTTP adapter.
//!
//! - `POST /api/flows/summarize`
//! - `POST /api/flows/reminder`
//! - `POST /api/flows/suggestions`

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::FlowsAppState;
pub use routes::flows_router;
