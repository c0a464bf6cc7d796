//! Single-shot prompt flows used by the clinic dashboard.
//!
//! Unlike assistant turns these never call tools: one prompt in, one
//! completion out.

mod personalize_reminder;
mod suggest_responses;
mod summarize_appointment;

pub use personalize_reminder::{
    PersonalizeReminderCommand, PersonalizeReminderHandler, ReminderChannel,
};
pub use suggest_responses::{SuggestResponsesCommand, SuggestResponsesHandler};
pub use summarize_appointment::{SummarizeAppointmentCommand, SummarizeAppointmentHandler};

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, TurnId, ValidationError};
use crate::ports::{AIError, AIProvider, CompletionRequest, MessageRole, RequestMetadata};

/// Errors from a prompt flow.
#[derive(Debug, Clone, Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("AI provider error: {0}")]
    Provider(#[from] AIError),

    /// The model answered with nothing usable.
    #[error("the model returned an empty response")]
    EmptyResponse,
}

impl FlowError {
    pub fn code(&self) -> ErrorCode {
        match self {
            FlowError::Validation(err) => ErrorCode::from(err),
            FlowError::Provider(AIError::Timeout { .. }) => ErrorCode::AssistantTimeout,
            FlowError::Provider(_) => ErrorCode::AssistantUnavailable,
            FlowError::EmptyResponse => ErrorCode::UnusableResponse,
        }
    }
}

/// Sends one prompt and returns the trimmed, non-empty completion.
pub(crate) async fn complete_once(
    provider: &dyn AIProvider,
    purpose: &str,
    system_prompt: &str,
    prompt: String,
    max_tokens: u32,
) -> Result<String, FlowError> {
    let request = CompletionRequest::new(RequestMetadata::new(TurnId::new(), purpose))
        .with_system_prompt(system_prompt)
        .with_message(MessageRole::User, prompt)
        .with_max_tokens(max_tokens)
        .with_temperature(0.4);

    let response = provider.complete(request).await.map_err(|err| {
        tracing::warn!(purpose, error = %err, "Prompt flow failed");
        FlowError::from(err)
    })?;

    let text = response.content.trim();
    if text.is_empty() {
        return Err(FlowError::EmptyResponse);
    }
    tracing::debug!(purpose, total_tokens = response.usage.total_tokens, "Prompt flow completed");
    Ok(text.to_string())
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::empty_field(field))
    } else {
        Ok(())
    }
}
