//! Tool calls requested by the model and the results sent back to it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A tool invocation proposed by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Provider-assigned id, echoed back with the result.
    id: String,
    name: String,
    arguments: Value,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &Value {
        &self.arguments
    }
}

/// Outcome of one tool call.
///
/// `success == false` is an ordinary outcome (slot taken, nothing found,
/// backend down) that the model is expected to explain to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    call_id: String,
    tool: String,
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl ToolCallResult {
    pub fn success(call: &ToolCallRequest, payload: Value) -> Self {
        Self {
            call_id: call.id.clone(),
            tool: call.name.clone(),
            success: true,
            payload: Some(payload),
            message: None,
        }
    }

    pub fn failure(call: &ToolCallRequest, message: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            tool: call.name.clone(),
            success: false,
            payload: None,
            message: Some(message.into()),
        }
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The JSON text handed back to the model as the tool's output.
    pub fn to_model_content(&self) -> String {
        let body = if self.success {
            json!({ "success": true, "data": self.payload })
        } else {
            json!({ "success": false, "error": self.message })
        };
        body.to_string()
    }
}
