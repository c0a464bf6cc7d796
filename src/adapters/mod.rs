//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the core to external systems:
//! - `ai` - Language model providers (OpenAI, Anthropic, mock)
//! - `clinic_api` - Clinic services over the clinic REST backend
//! - `memory` - Seeded in-memory clinic for development and tests
//! - `clock` - System and fixed clocks
//! - `http` - Axum REST surface

pub mod ai;
pub mod clinic_api;
pub mod clock;
pub mod http;
pub mod memory;

pub use clinic_api::{ClinicApiClient, ClinicApiClientConfig};
pub use clock::{FixedClock, SystemClock};
pub use memory::InMemoryClinic;
