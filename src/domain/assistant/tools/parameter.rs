//! Tool parameters and argument validation.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use crate::domain::clinic::{SlotDate, SlotTime, DATE_PATTERN, TIME_PATTERN};

/// Value type a parameter accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ParameterKind {
    String,
    /// `YYYY-MM-DD`
    Date,
    /// 24-hour `HH:mm`
    Time,
    Number,
    Boolean,
    Enumeration(Vec<String>),
}

impl ParameterKind {
    fn json_schema(&self, description: &str) -> Value {
        match self {
            ParameterKind::String => json!({ "type": "string", "description": description }),
            ParameterKind::Date => json!({
                "type": "string",
                "description": description,
                "pattern": DATE_PATTERN,
            }),
            ParameterKind::Time => json!({
                "type": "string",
                "description": description,
                "pattern": TIME_PATTERN,
            }),
            ParameterKind::Number => json!({ "type": "number", "description": description }),
            ParameterKind::Boolean => json!({ "type": "boolean", "description": description }),
            ParameterKind::Enumeration(values) => json!({
                "type": "string",
                "description": description,
                "enum": values,
            }),
        }
    }

    /// Checks one present, non-null argument value.
    fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            ParameterKind::String => value
                .as_str()
                .map(|_| ())
                .ok_or_else(|| "expected a string".to_string()),
            ParameterKind::Date => {
                let text = value.as_str().ok_or("expected a YYYY-MM-DD string")?;
                SlotDate::parse(text).map(|_| ()).map_err(|_| "expected YYYY-MM-DD".to_string())
            }
            ParameterKind::Time => {
                let text = value.as_str().ok_or("expected an HH:mm string")?;
                SlotTime::parse(text)
                    .map(|_| ())
                    .map_err(|_| "expected 24-hour HH:mm".to_string())
            }
            ParameterKind::Number => {
                if value.is_number() {
                    Ok(())
                } else {
                    Err("expected a number".to_string())
                }
            }
            ParameterKind::Boolean => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err("expected true or false".to_string())
                }
            }
            ParameterKind::Enumeration(values) => {
                let text = value.as_str().ok_or("expected a string")?;
                if values.iter().any(|allowed| allowed == text) {
                    Ok(())
                } else {
                    Err(format!("expected one of: {}", values.join(", ")))
                }
            }
        }
    }
}

/// One named parameter of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    name: String,
    kind: ParameterKind,
    description: String,
    required: bool,
    /// Filled from the caller's identity on patient turns; hidden from the model there.
    identity_bound: bool,
}

impl ParameterSpec {
    pub fn required(name: impl Into<String>, kind: ParameterKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
            identity_bound: false,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ParameterKind, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }

    /// Marks the parameter as carrying the patient's own name.
    pub fn bound_to_identity(mut self) -> Self {
        self.identity_bound = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_identity_bound(&self) -> bool {
        self.identity_bound
    }

    pub(super) fn json_schema(&self) -> Value {
        self.kind.json_schema(&self.description)
    }

    pub(super) fn check(&self, value: Option<&Value>) -> Option<FieldViolation> {
        match value {
            None | Some(Value::Null) if self.required => {
                Some(FieldViolation::new(&self.name, "is required"))
            }
            None | Some(Value::Null) => None,
            Some(value) => self
                .kind
                .check(value)
                .err()
                .map(|reason| FieldViolation::new(&self.name, reason)),
        }
    }
}

/// A single offending argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// Arguments that do not match a tool's parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaViolation {
    pub tool: String,
    pub violations: Vec<FieldViolation>,
}

impl SchemaViolation {
    /// Names of the offending fields, in parameter order.
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details: Vec<String> = self.violations.iter().map(ToString::to_string).collect();
        write!(f, "{}: {}", self.tool, details.join("; "))
    }
}
