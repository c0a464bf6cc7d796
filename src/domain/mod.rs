//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, state machine, errors)
//! - `clinic` - Appointments, invoices, patients and dashboard figures
//! - `assistant` - Tool schemas, personas and conversation turns

pub mod assistant;
pub mod clinic;
pub mod foundation;
