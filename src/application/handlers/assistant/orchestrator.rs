//! AssistantOrchestrator - drives one conversational turn.
//!
//! The loop: ask the model; if it requests tools, dispatch them all
//! concurrently, feed the results back in the model's order, and ask again.
//! A turn ends when the model answers in text, or fails when it runs past
//! the round budget, the turn deadline, or the provider gives up.
//!
//! Cancelling a turn stops waiting immediately. Tool calls already in
//! flight run to completion on their own tasks; their results are dropped.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::dispatcher::{DispatchContext, ToolDispatcher};
use crate::config::AssistantConfig;
use crate::domain::assistant::tools::{ModelTool, ToolCallRequest, ToolCallResult};
use crate::domain::assistant::{
    inspect_final_answer, AssistantError, ConversationTurn, DispatchError, Persona, PromptContext,
};
use crate::domain::clinic::PatientIdentity;
use crate::ports::{AIProvider, Clock, CompletionRequest, CompletionResponse, Message, RequestMetadata, TokenUsage};

type ToolOutcome = Result<ToolCallResult, DispatchError>;

/// Per-turn budgets.
#[derive(Debug, Clone)]
pub struct TurnLimits {
    pub max_tool_rounds: u32,
    pub turn_timeout: Duration,
    pub hygiene_retries: u32,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for TurnLimits {
    fn default() -> Self {
        Self::from(&AssistantConfig::default())
    }
}

impl From<&AssistantConfig> for TurnLimits {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            max_tool_rounds: config.max_tool_rounds,
            turn_timeout: config.turn_timeout(),
            hygiene_retries: config.hygiene_retries,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// A finished turn plus what it cost.
#[derive(Debug, Clone)]
pub struct CompletedTurn {
    pub turn: ConversationTurn,
    pub usage: TokenUsage,
}

impl CompletedTurn {
    pub fn response(&self) -> &str {
        self.turn.response().unwrap_or_default()
    }
}

/// Persona-agnostic turn driver.
pub struct AssistantOrchestrator {
    provider: Arc<dyn AIProvider>,
    dispatcher: Arc<ToolDispatcher>,
    clock: Arc<dyn Clock>,
    clinic_name: String,
    limits: TurnLimits,
}

impl AssistantOrchestrator {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        dispatcher: Arc<ToolDispatcher>,
        clock: Arc<dyn Clock>,
        clinic_name: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            clock,
            clinic_name: clinic_name.into(),
            limits: TurnLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: TurnLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &TurnLimits {
        &self.limits
    }

    /// Runs one turn to completion under the turn deadline.
    pub async fn run_turn(
        &self,
        persona: &Persona,
        utterance: &str,
        identity: Option<PatientIdentity>,
        cancel: &CancellationToken,
    ) -> Result<CompletedTurn, AssistantError> {
        let deadline = self.limits.turn_timeout;
        let span = tracing::info_span!("assistant_turn", persona = %persona.kind());

        let driven = tokio::time::timeout(deadline, self.drive(persona, utterance, identity, cancel))
            .instrument(span)
            .await;

        match driven {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    persona = %persona.kind(),
                    timeout_secs = deadline.as_secs(),
                    "Assistant turn timed out"
                );
                Err(AssistantError::Timeout {
                    after_secs: deadline.as_secs(),
                })
            }
        }
    }

    async fn drive(
        &self,
        persona: &Persona,
        utterance: &str,
        identity: Option<PatientIdentity>,
        cancel: &CancellationToken,
    ) -> Result<CompletedTurn, AssistantError> {
        let system_prompt = persona.render_system_prompt(&PromptContext {
            today: self.clock.today(),
            clinic_name: &self.clinic_name,
            patient_name: identity.as_ref().map(PatientIdentity::name),
        });
        let tools = self
            .dispatcher
            .registry()
            .model_tools(persona.tools(), persona.binds_identity())?;

        let mut turn = ConversationTurn::begin(
            persona.kind(),
            system_prompt,
            utterance,
            persona.tools().clone(),
        );
        let context = DispatchContext::for_persona(persona, identity);
        let mut messages = vec![Message::user(utterance)];
        let mut usage = TokenUsage::zero();
        let mut corrections = 0;

        tracing::info!(turn_id = %turn.id(), tools = tools.len(), "Assistant turn started");

        loop {
            let response = self.ask_model(&turn, &tools, &messages, cancel).await?;
            usage.accumulate(&response.usage);

            if !response.requests_tools() {
                match inspect_final_answer(&response.content) {
                    Ok(()) => {
                        turn.complete(response.content.trim())?;
                        tracing::info!(
                            turn_id = %turn.id(),
                            rounds = turn.rounds(),
                            tool_calls = turn.exchanges().len(),
                            total_tokens = usage.total_tokens,
                            "Assistant turn completed"
                        );
                        return Ok(CompletedTurn { turn, usage });
                    }
                    Err(violation) if corrections < self.limits.hygiene_retries => {
                        corrections += 1;
                        tracing::warn!(
                            turn_id = %turn.id(),
                            %violation,
                            attempt = corrections,
                            "Final answer rejected, asking model to rewrite"
                        );
                        messages.push(Message::assistant(response.content));
                        messages.push(Message::user(violation.correction()));
                        continue;
                    }
                    Err(violation) => {
                        tracing::warn!(turn_id = %turn.id(), %violation, "Final answer unusable");
                        return Err(AssistantError::UnusableResponse(violation.to_string()));
                    }
                }
            }

            if turn.rounds() >= self.limits.max_tool_rounds {
                tracing::warn!(
                    turn_id = %turn.id(),
                    rounds = turn.rounds(),
                    "Tool round budget exhausted"
                );
                return Err(AssistantError::Exhausted {
                    rounds: self.limits.max_tool_rounds,
                });
            }

            let round = turn.start_tool_round()?;
            tracing::debug!(
                turn_id = %turn.id(),
                round,
                calls = response.tool_calls.len(),
                "Dispatching tool round"
            );

            let outcomes = self.dispatch_round(&response.tool_calls, &context, cancel).await?;

            messages.push(Message::assistant_tool_calls(
                response.content,
                response.tool_calls.clone(),
            ));
            for (call, outcome) in response.tool_calls.into_iter().zip(outcomes) {
                turn.record(call, outcome);
                if let Some(exchange) = turn.exchanges().last() {
                    let result = exchange.result_for_model();
                    messages.push(Message::tool_result(
                        result.call_id().to_string(),
                        result.to_model_content(),
                    ));
                }
            }
            turn.finish_tool_round()?;
        }
    }

    async fn ask_model(
        &self,
        turn: &ConversationTurn,
        tools: &[ModelTool],
        messages: &[Message],
        cancel: &CancellationToken,
    ) -> Result<CompletionResponse, AssistantError> {
        let request = CompletionRequest::new(RequestMetadata::new(turn.id(), turn.persona().as_str()))
            .with_system_prompt(turn.system_prompt())
            .with_messages(messages.to_vec())
            .with_tools(tools.to_vec())
            .with_max_tokens(self.limits.max_tokens)
            .with_temperature(self.limits.temperature);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(turn_id = %turn.id(), "Assistant turn cancelled while awaiting model");
                Err(AssistantError::Cancelled)
            }
            result = self.provider.complete(request) => result.map_err(|err| {
                tracing::error!(turn_id = %turn.id(), error = %err, "Language model call failed");
                AssistantError::Unavailable(err.to_string())
            }),
        }
    }

    /// Runs every call of a round concurrently; outcomes come back in call order.
    async fn dispatch_round(
        &self,
        calls: &[ToolCallRequest],
        context: &DispatchContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<ToolOutcome>, AssistantError> {
        let handles: Vec<_> = calls
            .iter()
            .cloned()
            .map(|call| {
                let dispatcher = Arc::clone(&self.dispatcher);
                let context = context.clone();
                tokio::spawn(async move { dispatcher.dispatch(&call, &context).await })
            })
            .collect();

        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(in_flight = calls.len(), "Assistant turn cancelled during tool round");
                return Err(AssistantError::Cancelled);
            }
            joined = join_all(handles) => joined,
        };

        Ok(joined
            .into_iter()
            .zip(calls)
            .map(|(joined, call)| {
                joined.unwrap_or_else(|err| {
                    tracing::error!(tool = %call.name(), error = %err, "Tool task panicked");
                    Ok(ToolCallResult::failure(call, "The tool failed unexpectedly."))
                })
            })
            .collect())
    }
}
