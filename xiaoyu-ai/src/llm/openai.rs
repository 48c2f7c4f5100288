//! OpenAI-compatible chat-completions client
//!
//! Endpoint: `{base_url}/chat/completions` with bearer authentication.
//! Works with OpenAI and the many self-hosted or regional services that
//! expose the same API.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{LanguageModel, LlmError};

/// User-Agent header sent with every request
const USER_AGENT: &str = concat!("xiaoyu-ai/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`OpenAiClient`]
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    /// e.g. "https://api.openai.com/v1" (no trailing slash needed)
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error envelope returned by OpenAI-compatible services
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Chat-completions client
pub struct OpenAiClient {
    http_client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiClient {
    /// Create a client; fails only if the HTTP client cannot be built
    pub fn new(settings: OpenAiSettings) -> Result<Self, LlmError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );

        let http_client = Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Upstream(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: settings.api_key,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport_error(error: reqwest::Error) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout(error.to_string())
        } else {
            LlmError::classify(error.to_string())
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "Sending chat completion");

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Prefer the provider's own message when it sent the usual envelope
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!(status = status.as_u16(), "Chat completion failed: {}", message);
            return Err(LlmError::from_status(status.as_u16(), message));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("No completion content in response".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base_url: &str) -> OpenAiSettings {
        OpenAiSettings {
            api_key: "sk-test".to_string(),
            base_url: base_url.to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = OpenAiClient::new(settings("https://api.openai.com/v1")).unwrap();
        assert_eq!(client.endpoint(), "https://api.openai.com/v1/chat/completions");

        let client = OpenAiClient::new(settings("http://localhost:11434/v1/")).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/v1/chat/completions");
        assert_eq!(client.model_name(), "gpt-4o-mini");
    }

    #[test]
    fn test_request_wire_format() {
        let request = ChatRequest {
            model: "m",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "s",
                },
                ChatMessage {
                    role: "user",
                    content: "p",
                },
            ],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "p");
    }

    #[test]
    fn test_response_parsing() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"你好"}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("你好"));

        let envelope: ErrorEnvelope = serde_json::from_str(
            r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#,
        )
        .unwrap();
        assert_eq!(envelope.error.message, "Incorrect API key provided");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_error() {
        let client = OpenAiClient::new(OpenAiSettings {
            timeout: Duration::from_millis(500),
            ..settings("http://127.0.0.1:9")
        })
        .unwrap();
        let result = client.generate("system", "prompt").await;
        assert!(result.is_err());
    }
}
