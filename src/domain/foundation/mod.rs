//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, the state machine trait and validation errors
//! used across the clinic and assistant domains.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{AppointmentId, InvoiceId, PatientId, TurnId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
