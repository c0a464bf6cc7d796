//! AssistantReply - what a persona entry point hands back to its caller.

use serde::Serialize;

use super::orchestrator::CompletedTurn;
use crate::domain::assistant::AssistantError;
use crate::domain::foundation::ErrorCode;

/// Always carries text for the user; failures are folded into a generic message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    pub response: String,
    /// `None` when the turn produced a real answer.
    #[serde(skip)]
    pub failure: Option<ErrorCode>,
    #[serde(skip)]
    pub tool_calls: usize,
}

impl AssistantReply {
    pub fn answered(turn: &CompletedTurn) -> Self {
        Self {
            response: turn.response().to_string(),
            failure: None,
            tool_calls: turn.turn.exchanges().len(),
        }
    }

    pub fn failed(err: &AssistantError) -> Self {
        Self {
            response: err.user_message().to_string(),
            failure: Some(err.code()),
            tool_calls: 0,
        }
    }

    /// Reply for an empty query; no model call is made.
    pub fn prompt_for_query() -> Self {
        Self {
            response: "Please tell me what you need help with.".to_string(),
            failure: None,
            tool_calls: 0,
        }
    }

    pub fn is_answer(&self) -> bool {
        self.failure.is_none()
    }
}

impl From<Result<CompletedTurn, AssistantError>> for AssistantReply {
    fn from(result: Result<CompletedTurn, AssistantError>) -> Self {
        match result {
            Ok(turn) => Self::answered(&turn),
            Err(err) => Self::failed(&err),
        }
    }
}
