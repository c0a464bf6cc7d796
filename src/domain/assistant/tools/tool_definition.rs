//! Tool definition - schema and metadata for a clinic tool.
//!
//! A definition is the single source for three things: the JSON schema the
//! model sees, the validation applied to the model's arguments, and the
//! scope that decides which personas may carry the tool.
//!
//! ```ignore
//! let definition = ToolDefinition::new(
//!     "getAvailableSlots",
//!     "Get available appointment slots for a given date.",
//!     ToolScope::Public,
//! )
//! .with_parameter(ParameterSpec::required("date", ParameterKind::Date, "YYYY-MM-DD"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::parameter::{FieldViolation, ParameterSpec, SchemaViolation};

/// Who a tool's data belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolScope {
    /// Reveals nothing about any particular patient.
    Public,
    /// Operates on the calling patient's own records.
    PatientScoped,
    /// Clinic-wide data, staff only.
    Administrative,
}

/// Definition of a tool the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    name: String,
    description: String,
    scope: ToolScope,
    parameters: Vec<ParameterSpec>,
    output_schema: Value,
}

impl ToolDefinition {
    /// Creates a tool with no parameters.
    pub fn new(name: impl Into<String>, description: impl Into<String>, scope: ToolScope) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            scope,
            parameters: Vec::new(),
            output_schema: json!({ "type": "object" }),
        }
    }

    /// Appends a parameter. Order is preserved in the model schema.
    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_output_schema(mut self, schema: Value) -> Self {
        self.output_schema = schema;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn scope(&self) -> ToolScope {
        self.scope
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn output_schema(&self) -> &Value {
        &self.output_schema
    }

    /// True when some parameter is filled from the caller's identity.
    pub fn has_identity_parameter(&self) -> bool {
        self.parameters.iter().any(ParameterSpec::is_identity_bound)
    }

    /// JSON schema for the parameter object.
    ///
    /// With `hide_identity`, identity-bound parameters are left out entirely:
    /// the model cannot be asked for a value it is not allowed to choose.
    pub fn parameters_schema(&self, hide_identity: bool) -> Value {
        let visible = self
            .parameters
            .iter()
            .filter(|p| !(hide_identity && p.is_identity_bound()));

        let mut properties = Map::new();
        let mut required = Vec::new();
        for parameter in visible {
            properties.insert(parameter.name().to_string(), parameter.json_schema());
            if parameter.is_required() {
                required.push(Value::String(parameter.name().to_string()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// The model-facing view of this tool.
    pub fn model_tool(&self, hide_identity: bool) -> ModelTool {
        ModelTool {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.parameters_schema(hide_identity),
        }
    }

    /// Validates arguments against the declared parameters.
    ///
    /// Null arguments count as an empty object. Every problem is reported,
    /// not just the first, and unknown keys are rejected.
    pub fn validate(&self, arguments: &Value) -> Result<(), SchemaViolation> {
        let empty = Map::new();
        let object = match arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => {
                return Err(SchemaViolation {
                    tool: self.name.clone(),
                    violations: vec![FieldViolation::new("arguments", "must be a JSON object")],
                })
            }
        };

        let mut violations: Vec<FieldViolation> = self
            .parameters
            .iter()
            .filter_map(|p| p.check(object.get(p.name())))
            .collect();

        violations.extend(
            object
                .keys()
                .filter(|key| !self.parameters.iter().any(|p| p.name() == key.as_str()))
                .map(|key| FieldViolation::new(key.clone(), "is not a parameter of this tool")),
        );

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaViolation {
                tool: self.name.clone(),
                violations,
            })
        }
    }

    /// Writes the caller's name into every identity-bound parameter.
    ///
    /// Returns true when the model had supplied a different value that was
    /// overridden. Non-object arguments are left for `validate` to reject.
    pub fn bind_identity(&self, arguments: &mut Value, patient_name: &str) -> bool {
        if arguments.is_null() {
            *arguments = Value::Object(Map::new());
        }
        let Some(object) = arguments.as_object_mut() else {
            return false;
        };

        let mut overridden = false;
        for parameter in self.parameters.iter().filter(|p| p.is_identity_bound()) {
            let previous = object.insert(
                parameter.name().to_string(),
                Value::String(patient_name.to_string()),
            );
            if let Some(Value::String(previous)) = previous {
                overridden |= !previous.trim().eq_ignore_ascii_case(patient_name);
            }
        }
        overridden
    }
}

/// A tool as advertised to a language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ModelTool {
    /// Converts to OpenAI tool format.
    pub fn to_openai_format(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.input_schema
            }
        })
    }

    /// Converts to Anthropic tool format.
    pub fn to_anthropic_format(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "input_schema": self.input_schema
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assistant::tools::ParameterKind;

    fn my_appointments() -> ToolDefinition {
        ToolDefinition::new(
            "getMyAppointments",
            "List the patient's appointments",
            ToolScope::PatientScoped,
        )
        .with_parameter(
            ParameterSpec::required("patientName", ParameterKind::String, "Patient's full name")
                .bound_to_identity(),
        )
    }

    fn booking() -> ToolDefinition {
        ToolDefinition::new("bookAppointment", "Book", ToolScope::Administrative)
            .with_parameter(ParameterSpec::required("patientName", ParameterKind::String, "Name"))
            .with_parameter(ParameterSpec::required("date", ParameterKind::Date, "Day"))
            .with_parameter(ParameterSpec::required("time", ParameterKind::Time, "Slot"))
    }

    #[test]
    fn schema_lists_required_parameters() {
        let schema = booking().parameters_schema(false);
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["patientName", "date", "time"]));
        assert_eq!(schema["properties"]["time"]["type"], "string");
    }

    #[test]
    fn hidden_identity_parameters_vanish_from_schema() {
        let schema = my_appointments().parameters_schema(true);
        assert!(schema["properties"].as_object().unwrap().is_empty());
        assert_eq!(schema["required"], json!([]));

        let visible = my_appointments().parameters_schema(false);
        assert!(visible["properties"].get("patientName").is_some());
    }

    #[test]
    fn validate_reports_every_bad_field() {
        let violation = booking()
            .validate(&json!({ "date": "tomorrow", "time": "2 PM" }))
            .unwrap_err();
        assert_eq!(violation.fields(), vec!["patientName", "date", "time"]);
    }

    #[test]
    fn validate_rejects_unknown_keys_and_non_objects() {
        let violation = booking()
            .validate(&json!({
                "patientName": "John Doe",
                "date": "2024-08-15",
                "time": "09:00",
                "priority": "high"
            }))
            .unwrap_err();
        assert_eq!(violation.fields(), vec!["priority"]);

        let violation = booking().validate(&json!("book it")).unwrap_err();
        assert_eq!(violation.fields(), vec!["arguments"]);
    }

    #[test]
    fn bind_identity_overrides_model_supplied_name() {
        let mut args = json!({ "patientName": "Jane Smith" });
        assert!(my_appointments().bind_identity(&mut args, "John Doe"));
        assert_eq!(args["patientName"], "John Doe");

        let mut args = Value::Null;
        assert!(!my_appointments().bind_identity(&mut args, "John Doe"));
        assert_eq!(args["patientName"], "John Doe");
    }

    #[test]
    fn model_tool_formats() {
        let tool = booking().model_tool(false);
        let openai = tool.to_openai_format();
        assert_eq!(openai["type"], "function");
        assert_eq!(openai["function"]["name"], "bookAppointment");

        let anthropic = tool.to_anthropic_format();
        assert_eq!(anthropic["name"], "bookAppointment");
        assert!(anthropic["input_schema"].is_object());
    }
}
