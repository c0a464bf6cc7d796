//! Clinic API adapter - the collaborator ports over the clinic REST backend.
//!
//! Status handling follows the backend's conventions: 404 means "nothing
//! there", other 4xx carry a `message` meant for the user, and 5xx means
//! the backend is down.

mod client;
mod wire;

pub use client::{ClinicApiClient, ClinicApiClientConfig};
