//! Assistant HTTP adapter.
//!
//! - `POST /api/assistant` - administrator assistant
//! - `POST /api/patient/assistant` - patient assistant, identity asserted by the gateway
//! - `GET /api/assistant/tools?persona=` - model-facing tool schemas per persona

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::AssistantAppState;
pub use routes::assistant_router;
