//! Billing tools.

use serde::Deserialize;
use serde_json::json;

use crate::domain::assistant::tools::{ParameterKind, ParameterSpec, ToolDefinition, ToolScope};

use super::ToolName;

pub fn get_billing_overview() -> ToolDefinition {
    ToolDefinition::new(
        ToolName::GetBillingOverview.as_str(),
        "Get an overview of the clinic's billing, including total billed, total collected, \
         and outstanding amounts.",
        ToolScope::Administrative,
    )
    .with_output_schema(json!({
        "type": "object",
        "properties": {
            "totalBilled": { "type": "number" },
            "totalCollected": { "type": "number" },
            "outstanding": { "type": "number" }
        }
    }))
}

pub fn get_invoices() -> ToolDefinition {
    ToolDefinition::new(
        ToolName::GetInvoices.as_str(),
        "Get a list of invoices. Can be filtered by patient name.",
        ToolScope::Administrative,
    )
    .with_parameter(ParameterSpec::optional(
        "patientName",
        ParameterKind::String,
        "The name of the patient to filter invoices for.",
    ))
    .with_output_schema(json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "invoiceId": { "type": "string" },
                "patientName": { "type": "string" },
                "date": { "type": "string" },
                "amount": { "type": "number" },
                "status": { "type": "string", "enum": ["Paid", "Unpaid", "Overdue"] }
            }
        }
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFilterArgs {
    #[serde(default)]
    pub patient_name: Option<String>,
}
