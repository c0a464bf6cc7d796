//! Scripted AIProvider for tests and offline runs.
//!
//! Completions are queued up front and handed out in order: text answers,
//! tool-call batches or errors. A repeating fallback drives the tool loop
//! to its round limit, and a fixed delay exercises timeouts and
//! cancellation. Every request is recorded for assertions.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_tool_call("getAvailableSlots", json!({ "date": "2024-08-16" }))
//!     .with_response("The open slots are 9:00 AM and 10:00 AM.");
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::assistant::tools::ToolCallRequest;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

#[derive(Debug, Clone)]
pub struct MockAIProvider {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Returned once the queue is empty. Defaults to a plain text answer.
    fallback: Option<MockResponse>,
    info: ProviderInfo,
    delay: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
    call_ids: Arc<AtomicUsize>,
}

/// One scripted completion.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Answer in text.
    Text { content: String, usage: TokenUsage },
    /// Ask for tools. Calls with an empty id get a generated `call_{n}` id.
    Tools(Vec<ToolCallRequest>),
    Error(MockError),
}

/// Failures the mock can be told to return.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    ContextTooLong { tokens: u32, max: u32 },
    ContentFiltered,
    Unavailable,
    AuthenticationFailed,
    Network,
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContextTooLong { tokens, max } => AIError::context_too_long(tokens, max),
            MockError::ContentFiltered => AIError::content_filtered("mock filter"),
            MockError::Unavailable => AIError::unavailable("mock provider down"),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network => AIError::network("mock connection reset"),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            fallback: None,
            info: ProviderInfo::new("mock", "mock-model-1", 128000).with_functions(true),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            call_ids: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queues a text answer.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(MockResponse::Text {
            content: content.into(),
            usage: TokenUsage::new(10, 20, 1),
        })
    }

    /// Queues a response requesting several tool calls at once.
    pub fn with_tool_calls(self, calls: Vec<ToolCallRequest>) -> Self {
        self.push(MockResponse::Tools(calls))
    }

    /// Queues a response requesting a single tool call.
    pub fn with_tool_call(self, name: &str, arguments: Value) -> Self {
        self.push(MockResponse::Tools(vec![ToolCallRequest::new("", name, arguments)]))
    }

    /// Requests the same tool forever once the queue runs dry.
    pub fn repeating_tool_call(mut self, name: &str, arguments: Value) -> Self {
        self.fallback = Some(MockResponse::Tools(vec![ToolCallRequest::new(
            "", name, arguments,
        )]));
        self
    }

    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded requests.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    fn next_response(&self) -> MockResponse {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| MockResponse::Text {
                content: "Mock response".to_string(),
                usage: TokenUsage::new(5, 10, 1),
            })
    }

    fn assign_id(&self, call: ToolCallRequest) -> ToolCallRequest {
        if !call.id().is_empty() {
            return call;
        }
        let n = self.call_ids.fetch_add(1, Ordering::SeqCst) + 1;
        ToolCallRequest::new(format!("call_{}", n), call.name(), call.arguments().clone())
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Text { content, usage } => Ok(CompletionResponse {
                content,
                tool_calls: Vec::new(),
                usage,
                model: self.info.model.clone(),
                finish_reason: FinishReason::Stop,
            }),
            MockResponse::Tools(calls) => Ok(CompletionResponse {
                content: String::new(),
                tool_calls: calls.into_iter().map(|c| self.assign_id(c)).collect(),
                usage: TokenUsage::new(10, 5, 1),
                model: self.info.model.clone(),
                finish_reason: FinishReason::ToolCalls,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn estimate_tokens(&self, text: &str) -> u32 {
        text.split_whitespace().count().max(1) as u32
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TurnId;
    use crate::ports::{MessageRole, RequestMetadata};
    use serde_json::json;

    fn test_request() -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(TurnId::new(), "test"))
            .with_message(MessageRole::User, "Hello")
    }

    #[tokio::test]
    async fn returns_responses_in_order_then_default() {
        let provider = MockAIProvider::new().with_response("First").with_response("Second");

        assert_eq!(provider.complete(test_request()).await.unwrap().content, "First");
        assert_eq!(provider.complete(test_request()).await.unwrap().content, "Second");
        assert_eq!(provider.complete(test_request()).await.unwrap().content, "Mock response");
    }

    #[tokio::test]
    async fn tool_calls_get_generated_ids() {
        let provider = MockAIProvider::new()
            .with_tool_call("getDashboardStats", json!({}))
            .with_tool_call("getInvoices", json!({}));

        let first = provider.complete(test_request()).await.unwrap();
        let second = provider.complete(test_request()).await.unwrap();

        assert!(first.requests_tools());
        assert_eq!(first.finish_reason, FinishReason::ToolCalls);
        assert_eq!(first.tool_calls[0].id(), "call_1");
        assert_eq!(second.tool_calls[0].id(), "call_2");
        assert_eq!(second.tool_calls[0].name(), "getInvoices");
    }

    #[tokio::test]
    async fn explicit_ids_are_kept() {
        let provider = MockAIProvider::new()
            .with_tool_calls(vec![ToolCallRequest::new("x", "getPatients", json!({}))]);
        let response = provider.complete(test_request()).await.unwrap();
        assert_eq!(response.tool_calls[0].id(), "x");
    }

    #[tokio::test]
    async fn repeating_tool_call_never_runs_out() {
        let provider = MockAIProvider::new()
            .with_response("queued")
            .repeating_tool_call("getAvailableSlots", json!({ "date": "2024-08-16" }));

        assert_eq!(provider.complete(test_request()).await.unwrap().content, "queued");
        for _ in 0..3 {
            assert!(provider.complete(test_request()).await.unwrap().requests_tools());
        }
        assert_eq!(provider.call_count(), 4);
    }

    #[tokio::test]
    async fn returns_configured_error() {
        let provider =
            MockAIProvider::new().with_error(MockError::RateLimited { retry_after_secs: 30 });

        let err = provider.complete(test_request()).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(err, AIError::RateLimited { retry_after_secs: 30 }));
    }

    #[tokio::test]
    async fn tracks_calls() {
        let provider = MockAIProvider::new();
        provider.complete(test_request()).await.unwrap();
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.get_calls()[0].messages[0].content, "Hello");
        provider.clear_calls();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn respects_delay() {
        let provider = MockAIProvider::new().with_delay(Duration::from_millis(50));
        let start = std::time::Instant::now();
        provider.complete(test_request()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn mock_error_converts_to_ai_error() {
        assert!(matches!(
            AIError::from(MockError::Unavailable),
            AIError::Unavailable { .. }
        ));
        assert!(matches!(
            AIError::from(MockError::Timeout { timeout_secs: 30 }),
            AIError::Timeout { timeout_secs: 30 }
        ));
        assert!(matches!(
            AIError::from(MockError::AuthenticationFailed),
            AIError::AuthenticationFailed
        ));
    }
}
