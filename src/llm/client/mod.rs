//! Chat-completion client for OpenAI-compatible APIs.

mod config;
mod prompts;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use config::LlmConfig;
pub use prompts::DEFAULT_EXTRACTION_PROMPT;

/// A system instruction plus a user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

/// Anything that can answer a completion request with message text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Return the text content of the first completion choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to connect to LLM service
    #[error("Connection error: {0}")]
    Connection(String),
    /// API returned an error
    #[error("API error: {0}")]
    Api(String),
    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),
    /// No API key configured
    #[error("No API key configured (set LLM_API_KEY or OPENAI_API_KEY)")]
    MissingApiKey,
}

/// OpenAI chat-completions request format.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// OpenAI chat-completions response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<ChatError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatError {
    message: String,
}

/// LLM client for chat completions.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn call_chat(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey)?;

        let body = build_chat_request(&self.config, request);

        let url = self.config.completions_url();
        debug!("POST {} (model: {})", url, self.config.model);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !status.is_success() {
            return Err(LlmError::Api(format!("HTTP {}: {}", status, text)));
        }

        parse_chat_response(&text)
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.call_chat(request).await
    }
}

/// Request body for one completion: system message first, then user.
fn build_chat_request<'a>(
    config: &'a LlmConfig,
    request: &'a CompletionRequest,
) -> ChatRequest<'a> {
    ChatRequest {
        model: &config.model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: &request.system,
            },
            ChatMessage {
                role: "user",
                content: &request.user,
            },
        ],
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        top_p: config.top_p,
    }
}

/// Extract the first choice's message content from a response body.
pub(crate) fn parse_chat_response(body: &str) -> Result<String, LlmError> {
    let resp: ChatResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Parse(e.to_string()))?;

    if let Some(error) = resp.error {
        return Err(LlmError::Api(error.message));
    }

    resp.choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::Parse("empty completion".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_chat_request_body() {
        let mut config = LlmConfig::base_default().with_model("gpt-4o");
        config.max_tokens = 512;
        config.temperature = 0.5;
        config.top_p = 0.25;
        let request = CompletionRequest {
            system: "extract entities".to_string(),
            user: "FRESH VEGETABLE\nRAW".to_string(),
        };

        let body = serde_json::to_value(build_chat_request(&config, &request)).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "extract entities"},
                    {"role": "user", "content": "FRESH VEGETABLE\nRAW"}
                ],
                "max_tokens": 512,
                "temperature": 0.5,
                "top_p": 0.25
            })
        );
    }

    #[test]
    fn test_parse_chat_response() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"[]"}}]}"#;
        assert_eq!(parse_chat_response(body).unwrap(), "[]");
    }

    #[test]
    fn test_parse_chat_response_error_body() {
        let body = r#"{"error":{"message":"invalid api key","type":"auth"}}"#;
        let err = parse_chat_response(body).unwrap_err();
        assert!(matches!(err, LlmError::Api(msg) if msg == "invalid api key"));
    }

    #[test]
    fn test_parse_chat_response_without_choices() {
        assert!(matches!(
            parse_chat_response(r#"{"choices":[]}"#),
            Err(LlmError::Parse(_))
        ));
        assert!(matches!(
            parse_chat_response("not json"),
            Err(LlmError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = LlmClient::new(LlmConfig::base_default()).unwrap();
        let request = CompletionRequest {
            system: "s".to_string(),
            user: "u".to_string(),
        };
        assert!(matches!(
            client.complete(&request).await,
            Err(LlmError::MissingApiKey)
        ));
    }
}
