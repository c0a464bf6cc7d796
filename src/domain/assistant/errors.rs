//! Assistant error types.
//!
//! `DispatchError` covers one tool call and never ends a turn; the orchestrator
//! feeds it back to the model. `AssistantError` ends a turn and maps to one of
//! a few generic user-facing messages.

use thiserror::Error;

use super::tools::{RegistryError, SchemaViolation, ToolScope};
use crate::domain::foundation::ErrorCode;

/// Why a single tool call was refused before reaching a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The tool is permitted but nothing by that name is registered.
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    /// The tool is outside the persona's permitted set.
    #[error("tool '{0}' is not permitted for this assistant")]
    ToolNotPermitted(String),

    /// Arguments failed the tool's input schema.
    #[error("invalid arguments for {0}")]
    SchemaViolation(SchemaViolation),
}

impl DispatchError {
    /// Text returned to the model in place of a tool result.
    ///
    /// Kept vague for unknown and forbidden tools so the model learns nothing
    /// about tools it may not use.
    pub fn model_feedback(&self) -> String {
        match self {
            DispatchError::UnknownTool(_) | DispatchError::ToolNotPermitted(_) => {
                "This tool is not available. Answer with the tools you have.".to_string()
            }
            DispatchError::SchemaViolation(violation) => {
                let details: Vec<String> =
                    violation.violations.iter().map(ToString::to_string).collect();
                format!("Invalid arguments: {}. Fix them and try again.", details.join("; "))
            }
        }
    }

    pub fn tool(&self) -> &str {
        match self {
            DispatchError::UnknownTool(name) | DispatchError::ToolNotPermitted(name) => name,
            DispatchError::SchemaViolation(violation) => &violation.tool,
        }
    }
}

impl From<SchemaViolation> for DispatchError {
    fn from(violation: SchemaViolation) -> Self {
        DispatchError::SchemaViolation(violation)
    }
}

/// A persona whose tool set is inconsistent with the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersonaError {
    #[error("persona '{persona}' references unregistered tool '{tool}'")]
    UnknownTool { persona: String, tool: String },

    #[error("persona '{persona}' may not carry {scope:?} tool '{tool}'")]
    ScopeNotAllowed {
        persona: String,
        tool: String,
        scope: ToolScope,
    },

    #[error("persona '{persona}' has no tools")]
    EmptyToolSet { persona: String },
}

/// Failure of a whole assistant turn.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssistantError {
    /// The language model could not be reached or refused the request.
    #[error("assistant unavailable: {0}")]
    Unavailable(String),

    #[error("assistant turn timed out after {after_secs}s")]
    Timeout { after_secs: u64 },

    /// The model kept asking for tools past the round budget.
    #[error("assistant exceeded {rounds} tool rounds")]
    Exhausted { rounds: u32 },

    /// The final answer failed the output check after every re-prompt.
    #[error("assistant produced an unusable response: {0}")]
    UnusableResponse(String),

    #[error("assistant turn was cancelled")]
    Cancelled,

    #[error("assistant misconfigured: {0}")]
    Misconfigured(String),
}

impl AssistantError {
    /// Message safe to show the end user. Never includes internals.
    pub fn user_message(&self) -> &'static str {
        match self {
            AssistantError::Unavailable(_) => {
                "I'm sorry, the assistant is unavailable right now. Please try again in a few minutes."
            }
            AssistantError::Timeout { .. } => {
                "I'm sorry, that took too long to complete. Please try again."
            }
            AssistantError::Exhausted { .. } | AssistantError::UnusableResponse(_) => {
                "I'm sorry, I wasn't able to complete that request. Could you rephrase it?"
            }
            AssistantError::Cancelled => "The request was cancelled.",
            AssistantError::Misconfigured(_) => {
                "I'm sorry, I can't help with that right now. Please contact the clinic."
            }
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AssistantError::Unavailable(_) => ErrorCode::AssistantUnavailable,
            AssistantError::Timeout { .. } => ErrorCode::AssistantTimeout,
            AssistantError::Exhausted { .. } => ErrorCode::AssistantExhausted,
            AssistantError::UnusableResponse(_) => ErrorCode::UnusableResponse,
            AssistantError::Cancelled | AssistantError::Misconfigured(_) => {
                ErrorCode::InternalError
            }
        }
    }

    /// Whether asking again might succeed. Booking is not idempotent, so
    /// callers should only surface this as a hint, never auto-retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AssistantError::Unavailable(_) | AssistantError::Timeout { .. }
        )
    }
}

impl From<RegistryError> for AssistantError {
    fn from(err: RegistryError) -> Self {
        AssistantError::Misconfigured(err.to_string())
    }
}
