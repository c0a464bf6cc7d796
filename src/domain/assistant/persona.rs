//! Personas - the administrative and patient configurations of the assistant.
//!
//! A persona is data: a prompt template, a permitted tool set and whether the
//! caller's identity is bound into tool arguments. The orchestrator does not
//! branch on which persona it runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::PersonaError;
use super::tools::{ToolName, ToolRegistry, ToolScope, ToolSet};

/// Which class of user the assistant is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaKind {
    Administrator,
    Patient,
}

impl PersonaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaKind::Administrator => "administrator",
            PersonaKind::Patient => "patient",
        }
    }
}

impl fmt::Display for PersonaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "administrator" | "admin" => Ok(PersonaKind::Administrator),
            "patient" => Ok(PersonaKind::Patient),
            other => Err(format!("unknown persona '{}'", other)),
        }
    }
}

const ADMINISTRATOR_TEMPLATE: &str = "\
You are a helpful AI assistant for the administrator of {clinic_name}, a healthcare clinic. \
You help manage the appointment schedule, billing, clinic statistics and the patient directory.

Today's date is {today}. When the user says \"today\" or \"tomorrow\", work out the date from it before calling a tool.

When booking an appointment, always confirm the result of the booking. If the tool confirms the booking, \
respond like: \"The appointment has been successfully booked for [Patient Name] at [Time].\" \
If the slot is taken, say so and offer the available slots for that day.

When you list appointments, format them as a clear list, for example: \
\"Here are the appointments for today: - 10:00 AM: John Doe (Check-up) - 11:30 AM: Jane Smith (Consultation)\"

Be concise and professional.";

const PATIENT_TEMPLATE: &str = "\
You are a friendly and helpful AI assistant for {patient_name}, a patient at {clinic_name}.

Today's date is {today}. Your goal is to help them manage their own appointments: \
list them, find open slots, and reschedule.

When rescheduling, first confirm the full details of the appointment to be changed (date, time, type), \
then ask for the desired new date and time. Check the new time with getAvailableSlots before rescheduling. \
If the reschedule succeeds, state the new appointment details. If it fails, explain why and suggest another slot.

You can only see and change {patient_name}'s appointments. If asked about anyone else, \
politely explain that you can only help with their own appointments.";

/// Rules shared by every persona, appended after the persona's own text.
const OUTPUT_RULES: &str = "\
When you receive information from a tool, turn it into friendly, human-readable sentences. \
Write times in 12-hour form: if a tool returns [\"09:00\", \"10:00\"], say \"9:00 AM and 10:00 AM\". \
Never output raw JSON or markdown code blocks. \
Your final response must not include any trace of tool execution or internal reasoning, \
such as \"[Running tool...]\" messages.";

/// Values substituted into a persona template.
#[derive(Debug, Clone)]
pub struct PromptContext<'a> {
    pub today: NaiveDate,
    pub clinic_name: &'a str,
    pub patient_name: Option<&'a str>,
}

/// One assistant configuration.
#[derive(Debug, Clone)]
pub struct Persona {
    kind: PersonaKind,
    template: String,
    tools: ToolSet,
    binds_identity: bool,
}

impl Persona {
    /// Full clinic tool set, no identity binding.
    pub fn administrator() -> Self {
        Self {
            kind: PersonaKind::Administrator,
            template: ADMINISTRATOR_TEMPLATE.to_string(),
            tools: ToolSet::new(
                [
                    ToolName::GetAvailableSlots,
                    ToolName::BookAppointment,
                    ToolName::GetAppointments,
                    ToolName::RequestReschedule,
                    ToolName::GetBillingOverview,
                    ToolName::GetInvoices,
                    ToolName::GetDashboardStats,
                    ToolName::GetPatients,
                ]
                .map(|name| name.as_str()),
            ),
            binds_identity: false,
        }
    }

    /// Own appointments, open slots and reschedule, bound to the caller.
    pub fn patient() -> Self {
        Self {
            kind: PersonaKind::Patient,
            template: PATIENT_TEMPLATE.to_string(),
            tools: ToolSet::new(
                [
                    ToolName::GetMyAppointments,
                    ToolName::GetAvailableSlots,
                    ToolName::RequestReschedule,
                ]
                .map(|name| name.as_str()),
            ),
            binds_identity: true,
        }
    }

    /// A custom persona, mainly for tests and alternative deployments.
    pub fn custom(kind: PersonaKind, template: impl Into<String>, tools: ToolSet) -> Self {
        Self {
            kind,
            template: template.into(),
            tools,
            binds_identity: kind == PersonaKind::Patient,
        }
    }

    pub fn kind(&self) -> PersonaKind {
        self.kind
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub fn binds_identity(&self) -> bool {
        self.binds_identity
    }

    /// Checks the tool set against the registry and the persona's scope rules.
    ///
    /// Patient personas may only carry public and patient-scoped tools, and
    /// every patient-scoped tool they carry must take the caller's identity.
    pub fn validate(&self, registry: &ToolRegistry) -> Result<(), PersonaError> {
        let persona = self.kind.to_string();
        if self.tools.is_empty() {
            return Err(PersonaError::EmptyToolSet { persona });
        }

        for name in self.tools.iter() {
            let definition = registry.lookup(name).map_err(|_| PersonaError::UnknownTool {
                persona: persona.clone(),
                tool: name.to_string(),
            })?;

            if !self.binds_identity {
                continue;
            }
            let allowed = match definition.scope() {
                ToolScope::Public => true,
                ToolScope::PatientScoped => definition.has_identity_parameter(),
                ToolScope::Administrative => false,
            };
            if !allowed {
                return Err(PersonaError::ScopeNotAllowed {
                    persona: persona.clone(),
                    tool: name.to_string(),
                    scope: definition.scope(),
                });
            }
        }
        Ok(())
    }

    /// Renders the system prompt for one turn.
    pub fn render_system_prompt(&self, context: &PromptContext<'_>) -> String {
        let body = self
            .template
            .replace("{clinic_name}", context.clinic_name)
            .replace("{today}", &context.today.format("%Y-%m-%d").to_string())
            .replace("{patient_name}", context.patient_name.unwrap_or("the patient"));
        format!("{}\n\n{}", body, OUTPUT_RULES)
    }
}
