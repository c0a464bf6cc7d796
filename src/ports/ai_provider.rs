//! AIProvider port - one completion against a language model.
//!
//! Messages, tool calls and tool results are carried in a provider-neutral
//! shape. Adapters translate them to OpenAI or Anthropic wire formats; the
//! orchestrator owns the tool loop and only ever asks for one completion
//! at a time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::assistant::tools::{ModelTool, ToolCallRequest};
use crate::domain::foundation::TurnId;

/// A language model backend.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// One completion: either a text answer or a batch of tool calls.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;

    /// Rough token count, for logging and budgeting.
    fn estimate_tokens(&self, text: &str) -> u32;

    fn provider_info(&self) -> ProviderInfo;
}

/// Everything one completion needs.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Conversation so far, tool calls and results included.
    pub messages: Vec<Message>,
    pub system_prompt: Option<String>,
    /// Offered tools. Empty for prompt flows.
    pub tools: Vec<ModelTool>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub metadata: RequestMetadata,
}

impl CompletionRequest {
    pub fn new(metadata: RequestMetadata) -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: None,
            tools: Vec::new(),
            max_tokens: None,
            temperature: None,
            metadata,
        }
    }

    pub fn with_message(mut self, role: MessageRole, content: impl Into<String>) -> Self {
        self.messages.push(Message::new(role, content));
        self
    }

    /// Replaces the conversation.
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ModelTool>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// One conversation entry.
///
/// Assistant entries may carry `tool_calls` with empty text; tool entries
/// carry the `tool_call_id` they answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// An assistant message that requests tool calls.
    pub fn assistant_tool_calls(content: impl Into<String>, calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::assistant(content)
        }
    }

    /// The output of one tool call.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::new(MessageRole::Tool, content)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// Correlation data for logs.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub turn_id: TurnId,
    /// `administrator`, `patient` or `flow.<name>`.
    pub purpose: String,
}

impl RequestMetadata {
    pub fn new(turn_id: TurnId, purpose: impl Into<String>) -> Self {
        Self {
            turn_id,
            purpose: purpose.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    /// In the order the model listed them.
    pub tool_calls: Vec<ToolCallRequest>,
    pub usage: TokenUsage,
    pub model: String,
    pub finish_reason: FinishReason,
}

impl CompletionResponse {
    /// True when the model wants tools run before it answers.
    pub fn requests_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Tokens and estimated cost of one completion, or of a whole turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub estimated_cost_cents: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32, cost_cents: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
            estimated_cost_cents: cost_cents,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
        self.estimated_cost_cents += other.estimated_cost_cents;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    /// The model paused for tool results.
    ToolCalls,
    /// Cut off at `max_tokens`.
    Length,
    ContentFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// `openai`, `anthropic` or `mock`.
    pub name: String,
    pub model: String,
    pub max_context_tokens: u32,
    pub supports_functions: bool,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>, max_context_tokens: u32) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            max_context_tokens,
            supports_functions: false,
        }
    }

    pub fn with_functions(mut self, supports: bool) -> Self {
        self.supports_functions = supports;
        self
    }
}

/// Why a completion failed. Orchestrator and flows map every variant to a
/// generic user message; the detail only reaches logs.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AIError {
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    #[error("context too long: {tokens} tokens exceeds {max} limit")]
    ContextTooLong { tokens: u32, max: u32 },

    #[error("content filtered: {reason}")]
    ContentFiltered { reason: String },

    /// 5xx or overloaded.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with something we could not decode.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl AIError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn context_too_long(tokens: u32, max: u32) -> Self {
        Self::ContextTooLong { tokens, max }
    }

    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Worth another attempt after backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AIError::RateLimited { .. }
                | AIError::Unavailable { .. }
                | AIError::Network(_)
                | AIError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_sets_every_field() {
        let tool = ModelTool {
            name: "getDashboardStats".into(),
            description: "Clinic stats".into(),
            input_schema: json!({ "type": "object", "properties": {} }),
        };
        let request = CompletionRequest::new(RequestMetadata::new(TurnId::new(), "administrator"))
            .with_system_prompt("You help the front desk.")
            .with_message(MessageRole::User, "How many patients?")
            .with_tools(vec![tool])
            .with_max_tokens(256)
            .with_temperature(0.2);

        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.system_prompt.as_deref(), Some("You help the front desk."));
        assert_eq!(request.tools[0].name, "getDashboardStats");
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.metadata.purpose, "administrator");
    }

    #[test]
    fn tool_round_messages_link_by_call_id() {
        let call = ToolCallRequest::new("call_7", "getInvoices", json!({}));
        let asked = Message::assistant_tool_calls("", vec![call]);
        let answered = Message::tool_result("call_7", r#"{"success":true,"data":[]}"#);

        assert_eq!(asked.role, MessageRole::Assistant);
        assert_eq!(asked.tool_calls[0].id(), "call_7");
        assert_eq!(answered.role, MessageRole::Tool);
        assert_eq!(answered.tool_call_id.as_deref(), Some("call_7"));

        let wire = serde_json::to_value(Message::user("hi")).unwrap();
        assert!(wire.get("tool_calls").is_none());
        assert!(wire.get("tool_call_id").is_none());
    }

    #[test]
    fn turn_usage_is_the_sum_of_its_completions() {
        let mut turn = TokenUsage::zero();
        for usage in [TokenUsage::new(400, 30, 1), TokenUsage::new(520, 80, 2)] {
            turn.accumulate(&usage);
        }
        assert_eq!(turn, TokenUsage::new(920, 110, 3));
    }

    #[test]
    fn only_transient_failures_are_retried() {
        for retryable in [
            AIError::rate_limited(5),
            AIError::unavailable("overloaded"),
            AIError::network("reset"),
            AIError::Timeout { timeout_secs: 120 },
        ] {
            assert!(retryable.is_retryable(), "{}", retryable);
        }
        for fatal in [
            AIError::AuthenticationFailed,
            AIError::context_too_long(200_000, 128_000),
            AIError::content_filtered("policy"),
            AIError::parse("bad json"),
            AIError::InvalidRequest("unknown field".into()),
        ] {
            assert!(!fatal.is_retryable(), "{}", fatal);
        }
    }

    #[test]
    fn wire_names() {
        assert_eq!(serde_json::to_value(MessageRole::Tool).unwrap(), json!("tool"));
        assert_eq!(serde_json::to_value(FinishReason::ToolCalls).unwrap(), json!("tool_calls"));
    }
}
