//! clinic-assist - tool-calling assistant for a medical clinic.
//!
//! A language model answers staff and patient questions by calling a fixed
//! catalogue of clinic tools (appointments, patients, invoices, stats).
//! The core owns the tool schemas, checks every call the model makes
//! against them and against the caller's persona, routes valid calls to
//! the clinic services, and bounds each turn by rounds, time and
//! cancellation.
//!
//! Layout follows ports and adapters: `domain` holds the tool catalogue,
//! personas and clinic records; `ports` the traits the core depends on;
//! `application` the dispatcher, orchestrator and prompt flows; `adapters`
//! the model providers, clinic backends and HTTP surface.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
