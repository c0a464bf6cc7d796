//! Conversation turn - the record of one request/response cycle.
//!
//! A turn alternates between waiting on the model and waiting on tools until
//! the model answers without asking for tools:
//!
//! ```text
//! AwaitingModel ──tool calls──▶ AwaitingTools
//!       ▲                             │
//!       └────────results fed back─────┘
//! AwaitingModel ──final text──▶ Done
//! ```
//!
//! Turns live for a single request and are never persisted.

use serde::{Deserialize, Serialize};

use super::errors::{AssistantError, DispatchError};
use super::persona::PersonaKind;
use super::tools::{ToolCallRequest, ToolCallResult, ToolSet};
use crate::domain::foundation::{StateMachine, Timestamp, TurnId};

/// Where a turn is in its model/tool loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    AwaitingModel,
    AwaitingTools,
    Done,
}

impl StateMachine for TurnPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TurnPhase::*;
        matches!(
            (self, target),
            (AwaitingModel, AwaitingTools) | (AwaitingTools, AwaitingModel) | (AwaitingModel, Done)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TurnPhase::*;
        match self {
            AwaitingModel => vec![AwaitingTools, Done],
            AwaitingTools => vec![AwaitingModel],
            Done => vec![],
        }
    }
}

/// One tool call and what came of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExchange {
    pub round: u32,
    pub request: ToolCallRequest,
    pub outcome: Result<ToolCallResult, DispatchError>,
}

impl ToolExchange {
    /// The result the model saw, whether dispatched or refused.
    pub fn result_for_model(&self) -> ToolCallResult {
        match &self.outcome {
            Ok(result) => result.clone(),
            Err(err) => ToolCallResult::failure(&self.request, err.model_feedback()),
        }
    }
}

/// A single assistant turn.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    id: TurnId,
    persona: PersonaKind,
    system_prompt: String,
    utterance: String,
    permitted: ToolSet,
    phase: TurnPhase,
    rounds: u32,
    exchanges: Vec<ToolExchange>,
    response: Option<String>,
    started_at: Timestamp,
}

impl ConversationTurn {
    pub fn begin(
        persona: PersonaKind,
        system_prompt: impl Into<String>,
        utterance: impl Into<String>,
        permitted: ToolSet,
    ) -> Self {
        Self {
            id: TurnId::new(),
            persona,
            system_prompt: system_prompt.into(),
            utterance: utterance.into(),
            permitted,
            phase: TurnPhase::AwaitingModel,
            rounds: 0,
            exchanges: Vec::new(),
            response: None,
            started_at: Timestamp::now(),
        }
    }

    pub fn id(&self) -> TurnId {
        self.id
    }

    pub fn persona(&self) -> PersonaKind {
        self.persona
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn utterance(&self) -> &str {
        &self.utterance
    }

    pub fn permitted(&self) -> &ToolSet {
        &self.permitted
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Completed tool rounds so far.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Tool exchanges in the order the model requested them.
    pub fn exchanges(&self) -> &[ToolExchange] {
        &self.exchanges
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// Moves to `AwaitingTools` and opens a new round. Returns its number.
    pub fn start_tool_round(&mut self) -> Result<u32, AssistantError> {
        self.advance(TurnPhase::AwaitingTools)?;
        self.rounds += 1;
        Ok(self.rounds)
    }

    pub fn record(&mut self, request: ToolCallRequest, outcome: Result<ToolCallResult, DispatchError>) {
        self.exchanges.push(ToolExchange {
            round: self.rounds,
            request,
            outcome,
        });
    }

    /// Back to the model with this round's results.
    pub fn finish_tool_round(&mut self) -> Result<(), AssistantError> {
        self.advance(TurnPhase::AwaitingModel)
    }

    pub fn complete(&mut self, response: impl Into<String>) -> Result<(), AssistantError> {
        self.advance(TurnPhase::Done)?;
        self.response = Some(response.into());
        Ok(())
    }

    fn advance(&mut self, target: TurnPhase) -> Result<(), AssistantError> {
        self.phase = self
            .phase
            .transition_to(target)
            .map_err(|err| AssistantError::Misconfigured(err.to_string()))?;
        Ok(())
    }
}
