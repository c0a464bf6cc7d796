//! Clinic domain - the records the assistant reads and changes through tools.
//!
//! These types are owned by the clinic backend; the assistant only sees them
//! through the collaborator ports.

mod billing;
mod patient;
mod schedule;
mod stats;

pub use billing::{BillingOverview, Invoice, InvoiceStatus};
pub use patient::{Patient, PatientIdentity};
pub use schedule::{
    Appointment, AppointmentStatus, BookingOutcome, BookingRequest, PatientRef,
    RescheduleRequest, SlotDate, SlotTime, DATE_PATTERN, TIME_PATTERN,
};
pub use stats::DashboardStats;
