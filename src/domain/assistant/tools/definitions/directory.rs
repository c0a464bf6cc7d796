//! Patient directory and clinic statistics tools.

use serde::Deserialize;
use serde_json::json;

use crate::domain::assistant::tools::{ParameterKind, ParameterSpec, ToolDefinition, ToolScope};

use super::ToolName;

pub fn get_dashboard_stats() -> ToolDefinition {
    ToolDefinition::new(
        ToolName::GetDashboardStats.as_str(),
        "Get key statistics for the clinic, including total patients, appointments for today, \
         AI interactions, and revenue.",
        ToolScope::Administrative,
    )
    .with_output_schema(json!({
        "type": "object",
        "properties": {
            "totalPatients": { "type": "number" },
            "appointmentsToday": { "type": "number" },
            "aiInteractions": { "type": "number" },
            "revenue": { "type": "number" }
        }
    }))
}

pub fn get_patients() -> ToolDefinition {
    ToolDefinition::new(
        ToolName::GetPatients.as_str(),
        "Get a list of patients. Can be filtered by patient name to search for a specific patient.",
        ToolScope::Administrative,
    )
    .with_parameter(ParameterSpec::optional(
        "name",
        ParameterKind::String,
        "The name of the patient to search for.",
    ))
    .with_output_schema(json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "name": { "type": "string" },
                "email": { "type": "string" },
                "avatar": { "type": "string" }
            }
        }
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct PatientSearchArgs {
    #[serde(default)]
    pub name: Option<String>,
}
