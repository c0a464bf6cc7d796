//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Language Model
//!
//! - `AIProvider` - tool-calling completions
//!
//! ## Clinic Collaborators
//!
//! - `SchedulingService` - slots, bookings, reschedules
//! - `PatientDirectory` - patient search
//! - `BillingLedger` - billing overview and invoices
//! - `ClinicStats` - dashboard figures
//!
//! ## Environment
//!
//! - `Clock` - the current date

mod ai_provider;
mod billing_ledger;
mod clinic_stats;
mod clock;
mod collaborator_error;
mod patient_directory;
mod scheduling_service;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use billing_ledger::BillingLedger;
pub use clinic_stats::ClinicStats;
pub use clock::Clock;
pub use collaborator_error::CollaboratorError;
pub use patient_directory::PatientDirectory;
pub use scheduling_service::SchedulingService;
