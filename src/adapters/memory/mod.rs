//! In-memory collaborators.
//!
//! Used for local development without a clinic backend, and as the
//! deterministic fixture for dispatcher and orchestrator tests.

mod clinic;

pub use clinic::InMemoryClinic;
