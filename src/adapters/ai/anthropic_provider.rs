//! Anthropic Provider - Implementation of AIProvider for Anthropic's Messages API.
//!
//! Tool calls travel as `tool_use` content blocks and their results as
//! `tool_result` blocks inside a user message.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AnthropicConfig::new(api_key)
//!     .with_model("claude-3-5-haiku-20241022")
//!     .with_base_url("https://api.anthropic.com");
//!
//! let provider = AnthropicProvider::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::assistant::tools::ToolCallRequest;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, TokenUsage,
};

/// Configuration for the Anthropic provider.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    api_key: Secret<String>,
    /// Model to use (e.g., "claude-3-5-haiku-20241022").
    pub model: String,
    /// Base URL for the API (default: https://api.anthropic.com).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl AnthropicConfig {
    /// Creates a configuration for `api_key`, defaulting to `claude-3-5-haiku-20241022`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "claude-3-5-haiku-20241022".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 3,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the API root. A trailing slash is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Exposes the API key for the auth header.
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Anthropic API version header value.
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Anthropic API provider implementation.
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    /// Creates a provider. Falls back to a default client if the configured
    /// one cannot be built.
    pub fn new(config: AnthropicConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    /// Endpoint every completion is posted to.
    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }

    /// Converts our request to Anthropic's format.
    fn to_anthropic_request(&self, request: &CompletionRequest) -> AnthropicRequest {
        let mut messages: Vec<AnthropicMessage> = Vec::new();

        for msg in &request.messages {
            let (role, blocks) = match msg.role {
                // System text goes in the top-level `system` field
                MessageRole::System => continue,
                MessageRole::User => ("user", vec![text_block(&msg.content)]),
                MessageRole::Assistant => ("assistant", assistant_blocks(msg)),
                MessageRole::Tool => ("user", vec![tool_result_block(msg)]),
            };

            // Consecutive same-role messages merge; the API rejects two user
            // turns in a row, which is exactly what parallel tool results are.
            match messages.last_mut() {
                Some(last) if last.role == role => last.content.extend(blocks),
                _ => messages.push(AnthropicMessage {
                    role: role.to_string(),
                    content: blocks,
                }),
            }
        }

        let system = match (&request.system_prompt, system_messages(request)) {
            (Some(prompt), extra) if extra.is_empty() => Some(prompt.clone()),
            (Some(prompt), extra) => Some(format!("{}\n\n{}", prompt, extra)),
            (None, extra) if extra.is_empty() => None,
            (None, extra) => Some(extra),
        };

        AnthropicRequest {
            model: self.config.model.clone(),
            messages,
            system,
            tools: request.tools.iter().map(|t| t.to_anthropic_format()).collect(),
            max_tokens: request.max_tokens.unwrap_or(1024),
            temperature: request.temperature,
        }
    }

    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let anthropic_request = self.to_anthropic_request(request);

        self.client
            .post(self.messages_url())
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("Content-Type", "application/json")
            .json(&anthropic_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(AIError::AuthenticationFailed),
            429 => Err(AIError::rate_limited(Self::parse_retry_after(&error_body))),
            400 => {
                if error_body.contains("prompt is too long") {
                    Err(AIError::context_too_long(0, 0))
                } else {
                    Err(AIError::InvalidRequest(error_body))
                }
            }
            // 529 is Anthropic's "overloaded"
            500..=599 => Err(AIError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(AIError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Reads "try again in Ns" out of a rate-limit body. Defaults to 60s.
    fn parse_retry_after(error_body: &str) -> u32 {
        serde_json::from_str::<Value>(error_body)
            .ok()
            .and_then(|parsed| {
                let message = parsed.get("error")?.get("message")?.as_str()?.to_string();
                let idx = message.find("try again in ")?;
                let digits: String = message[idx + 13..]
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect();
                digits.parse::<u32>().ok()
            })
            .unwrap_or(60)
    }

    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, AIError> {
        let response = self.handle_response_status(response).await?;

        let anthropic_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        let mut text = Vec::new();
        let mut tool_calls = Vec::new();
        for block in anthropic_response.content {
            match block {
                ResponseBlock::Text { text: t } if !t.trim().is_empty() => text.push(t),
                ResponseBlock::Text { .. } => {}
                ResponseBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCallRequest::new(id, name, input))
                }
                ResponseBlock::Other => {}
            }
        }

        let finish_reason = match anthropic_response.stop_reason.as_deref() {
            Some("tool_use") => FinishReason::ToolCalls,
            Some("max_tokens") => FinishReason::Length,
            _ => FinishReason::Stop,
        };

        let usage = TokenUsage::new(
            anthropic_response.usage.input_tokens,
            anthropic_response.usage.output_tokens,
            self.calculate_cost(
                anthropic_response.usage.input_tokens,
                anthropic_response.usage.output_tokens,
            ),
        );

        Ok(CompletionResponse {
            content: text.join("\n"),
            tool_calls,
            usage,
            model: anthropic_response.model,
            finish_reason,
        })
    }

    /// Estimated cost in cents based on model and token counts.
    fn calculate_cost(&self, input_tokens: u32, output_tokens: u32) -> u32 {
        // Prices per 1M tokens (in cents)
        let (input_price, output_price) = match self.config.model.as_str() {
            m if m.contains("opus") => (1500, 7500),
            m if m.contains("sonnet") => (300, 1500),
            m if m.contains("3-5-haiku") => (80, 400),
            m if m.contains("haiku") => (25, 125),
            _ => (300, 1500),
        };

        let input_cost = (input_tokens as u64 * input_price) / 1_000_000;
        let output_cost = (output_tokens as u64 * output_price) / 1_000_000;

        (input_cost + output_cost) as u32
    }
}

fn text_block(text: &str) -> Value {
    json!({ "type": "text", "text": text })
}

fn assistant_blocks(msg: &Message) -> Vec<Value> {
    let mut blocks = Vec::with_capacity(msg.tool_calls.len() + 1);
    // Empty text blocks are rejected by the API
    if !msg.content.trim().is_empty() {
        blocks.push(text_block(&msg.content));
    }
    blocks.extend(msg.tool_calls.iter().map(|call| {
        let input = if call.arguments().is_object() {
            call.arguments().clone()
        } else {
            json!({})
        };
        json!({ "type": "tool_use", "id": call.id(), "name": call.name(), "input": input })
    }));
    blocks
}

fn tool_result_block(msg: &Message) -> Value {
    json!({
        "type": "tool_result",
        "tool_use_id": msg.tool_call_id.as_deref().unwrap_or_default(),
        "content": msg.content,
    })
}

/// Any system-role messages in the conversation, joined.
fn system_messages(request: &CompletionRequest) -> String {
    request
        .messages
        .iter()
        .filter(|m| m.role == MessageRole::System)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl AIProvider for AnthropicProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let mut retry_count = 0;

        loop {
            let attempt = match self.send_request(&request).await {
                Ok(response) => self.parse_response(response).await,
                Err(err) => Err(err),
            };

            match attempt {
                Ok(completion) => return Ok(completion),
                Err(err) if !err.is_retryable() || retry_count >= self.config.max_retries => {
                    return Err(err)
                }
                Err(err) => {
                    tracing::warn!(
                        provider = "anthropic",
                        attempt = retry_count + 1,
                        error = %err,
                        "Retrying completion"
                    );
                }
            }

            // Exponential backoff: 500ms, 1s, 2s, ...
            sleep(Duration::from_millis(500 << retry_count)).await;
            retry_count += 1;
        }
    }

    fn estimate_tokens(&self, text: &str) -> u32 {
        // Claude averages ~3.5 characters per token
        ((text.len() as f64 / 3.5).ceil() as u32).max(1)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("anthropic", &self.config.model, 200000).with_functions(true)
    }
}

// ----- Anthropic API Types -----

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<ResponseBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assistant::tools::ModelTool;
    use crate::domain::foundation::TurnId;
    use crate::ports::RequestMetadata;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(TurnId::new(), "patient"))
            .with_system_prompt("You are a clinic assistant.")
            .with_message(MessageRole::User, "When is my appointment?")
            .with_tools(vec![ModelTool {
                name: "getMyAppointments".into(),
                description: "The patient's appointments".into(),
                input_schema: json!({ "type": "object", "properties": {} }),
            }])
    }

    fn provider(server: &MockServer) -> AnthropicProvider {
        AnthropicProvider::new(
            AnthropicConfig::new("test-key")
                .with_base_url(server.uri())
                .with_max_retries(0),
        )
    }

    #[test]
    fn parallel_tool_results_share_one_user_turn() {
        let provider = AnthropicProvider::new(AnthropicConfig::new("k"));
        let req = request().with_messages(vec![
            Message::user("slots and stats?"),
            Message::assistant_tool_calls(
                "",
                vec![
                    ToolCallRequest::new("tu_1", "getAvailableSlots", json!({ "date": "2024-08-16" })),
                    ToolCallRequest::new("tu_2", "getDashboardStats", json!(null)),
                ],
            ),
            Message::tool_result("tu_1", "{}"),
            Message::tool_result("tu_2", "{}"),
        ]);

        let body = serde_json::to_value(provider.to_anthropic_request(&req)).unwrap();
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(body["system"], "You are a clinic assistant.");

        let assistant = messages[1]["content"].as_array().unwrap();
        assert_eq!(assistant.len(), 2);
        assert_eq!(assistant[0]["type"], "tool_use");
        assert_eq!(assistant[1]["input"], json!({}));

        let results = messages[2]["content"].as_array().unwrap();
        assert_eq!(messages[2]["role"], "user");
        assert_eq!(results[0]["tool_use_id"], "tu_1");
        assert_eq!(results[1]["tool_use_id"], "tu_2");
        assert_eq!(body["tools"][0]["name"], "getMyAppointments");
    }

    #[tokio::test]
    async fn parses_tool_use_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", ANTHROPIC_API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "claude-3-5-haiku-20241022",
                "content": [
                    { "type": "text", "text": "  " },
                    { "type": "tool_use", "id": "tu_9", "name": "getMyAppointments", "input": {} }
                ],
                "stop_reason": "tool_use",
                "usage": { "input_tokens": 200, "output_tokens": 30 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider(&server).complete(request()).await.unwrap();
        assert_eq!(response.content, "");
        assert_eq!(response.finish_reason, FinishReason::ToolCalls);
        assert_eq!(response.tool_calls[0].id(), "tu_9");
        assert_eq!(response.usage.total_tokens, 230);
    }

    #[tokio::test]
    async fn overloaded_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = provider(&server).complete(request()).await.unwrap_err();
        assert!(matches!(err, AIError::Unavailable { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn cost_calculation_haiku() {
        let provider = AnthropicProvider::new(AnthropicConfig::new("k"));
        // 3.5 haiku: 80 / 400 cents per 1M
        assert_eq!(provider.calculate_cost(1_000_000, 1_000_000), 480);
    }

    #[test]
    fn estimate_tokens_rounds_up() {
        let provider = AnthropicProvider::new(AnthropicConfig::new("k"));
        assert_eq!(provider.estimate_tokens("Hi"), 1);
        assert_eq!(provider.estimate_tokens("Hello, world!"), 4);
    }
}
