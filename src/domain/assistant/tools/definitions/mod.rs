//! The clinic's tool catalog.
//!
//! One function per tool builds its definition; `clinic_registry` registers
//! them all. The typed `*Args` structs are what the dispatcher decodes
//! validated arguments into.

mod billing;
mod calendar;
mod directory;

pub use billing::{get_billing_overview, get_invoices, InvoiceFilterArgs};
pub use calendar::{
    book_appointment, get_appointments, get_available_slots, get_my_appointments,
    request_reschedule, BookAppointmentArgs, DateArgs, PatientNameArgs, RequestRescheduleArgs,
};
pub use directory::{get_dashboard_stats, get_patients, PatientSearchArgs};

use std::fmt;
use std::str::FromStr;

use super::{RegistryError, ToolRegistry};

/// Every tool the clinic exposes, by wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GetAvailableSlots,
    BookAppointment,
    GetAppointments,
    GetMyAppointments,
    RequestReschedule,
    GetBillingOverview,
    GetInvoices,
    GetDashboardStats,
    GetPatients,
}

impl ToolName {
    pub const ALL: [ToolName; 9] = [
        ToolName::GetAvailableSlots,
        ToolName::BookAppointment,
        ToolName::GetAppointments,
        ToolName::GetMyAppointments,
        ToolName::RequestReschedule,
        ToolName::GetBillingOverview,
        ToolName::GetInvoices,
        ToolName::GetDashboardStats,
        ToolName::GetPatients,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::GetAvailableSlots => "getAvailableSlots",
            ToolName::BookAppointment => "bookAppointment",
            ToolName::GetAppointments => "getAppointments",
            ToolName::GetMyAppointments => "getMyAppointments",
            ToolName::RequestReschedule => "requestReschedule",
            ToolName::GetBillingOverview => "getBillingOverview",
            ToolName::GetInvoices => "getInvoices",
            ToolName::GetDashboardStats => "getDashboardStats",
            ToolName::GetPatients => "getPatients",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| RegistryError::UnknownTool(s.to_string()))
    }
}

/// Registry holding the full clinic catalog.
pub fn clinic_registry() -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    for definition in [
        get_available_slots(),
        book_appointment(),
        get_appointments(),
        get_my_appointments(),
        request_reschedule(),
        get_billing_overview(),
        get_invoices(),
        get_dashboard_stats(),
        get_patients(),
    ] {
        registry.register(definition)?;
    }
    Ok(registry)
}
