//! Application layer - Commands and Handlers.
//!
//! Orchestrates domain operations and coordinates between ports. Handlers
//! take a command, call through ports, and return a result the adapters can
//! render.

pub mod handlers;

pub use handlers::*;
