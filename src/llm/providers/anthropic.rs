// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Anthropic Claude API provider implementation
//!
//! Streams tokens from the Messages API over SSE.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, NexusError, Result};
use crate::llm::provider::{ChatOptions, LlmProvider, ModelInfo, TokenChunk, TokenStream};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Anthropic Claude provider
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create with a custom base URL
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the model id
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Parse an error response body into a typed error
    fn parse_error(&self, status: u16, body: &str) -> NexusError {
        if let Ok(error_response) = serde_json::from_str::<AnthropicError>(body) {
            match error_response.error.error_type.as_str() {
                "authentication_error" => NexusError::Api(ApiError::AuthenticationFailed),
                "rate_limit_error" => NexusError::Api(ApiError::RateLimited(10)),
                "not_found_error" => {
                    NexusError::Api(ApiError::ModelNotFound(self.model.clone()))
                }
                _ => NexusError::Api(ApiError::ServerError {
                    status,
                    message: error_response.error.message,
                }),
            }
        } else {
            NexusError::Api(ApiError::ServerError {
                status,
                message: body.to_string(),
            })
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: self.model.clone(),
            display_name: "Claude Sonnet 4".to_string(),
            context_window: 200_000,
            max_output_tokens: 64_000,
        }]
    }

    async fn stream_chat(&self, options: ChatOptions) -> Result<TokenStream> {
        let body = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            system: options.system,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: options.user,
            }],
            stream: true,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status, &body));
        }

        let model_id = self.model.clone();
        let byte_stream = response.bytes_stream();

        let token_stream = byte_stream
            .map(|result| {
                result.map_err(|e| NexusError::Api(ApiError::StreamError(e.to_string())))
            })
            .scan(String::new(), move |buffer, result| {
                let chunk = match result {
                    Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
                    Err(e) => return futures::future::ready(Some(vec![Err(e)])),
                };

                buffer.push_str(&chunk);

                let mut items = Vec::new();

                // SSE events are separated by a blank line
                while let Some(pos) = buffer.find("\n\n") {
                    let event_str = buffer[..pos].to_string();
                    *buffer = buffer[pos + 2..].to_string();

                    match parse_sse_event(&event_str) {
                        Some(SseEvent::Token(token)) => items.push(Ok(TokenChunk {
                            token,
                            model_id: model_id.clone(),
                        })),
                        Some(SseEvent::Error(message)) => {
                            items.push(Err(NexusError::Api(ApiError::StreamError(message))));
                        }
                        Some(SseEvent::Stop) | None => {}
                    }
                }

                futures::future::ready(Some(items))
            })
            .flat_map(futures::stream::iter);

        Ok(Box::pin(token_stream))
    }
}

enum SseEvent {
    Token(String),
    Stop,
    Error(String),
}

/// Parse one Server-Sent Event block
fn parse_sse_event(event_str: &str) -> Option<SseEvent> {
    let mut event_type = None;
    let mut data = None;

    for line in event_str.lines() {
        if let Some(rest) = line.strip_prefix("event: ") {
            event_type = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix("data: ") {
            data = Some(rest.to_string());
        }
    }

    let event_type = event_type?;
    let data = data?;

    match event_type.as_str() {
        "content_block_delta" => {
            let parsed: serde_json::Value = serde_json::from_str(&data).ok()?;
            let delta = &parsed["delta"];
            if delta["type"].as_str()? == "text_delta" {
                Some(SseEvent::Token(delta["text"].as_str()?.to_string()))
            } else {
                None
            }
        }
        "message_stop" => Some(SseEvent::Stop),
        "error" => {
            let parsed: serde_json::Value = serde_json::from_str(&data).ok()?;
            Some(SseEvent::Error(
                parsed["error"]["message"].as_str()?.to_string(),
            ))
        }
        _ => None,
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<AnthropicMessage>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let provider = AnthropicProvider::new("test-key");
        assert_eq!(provider.name(), "anthropic");
    }

    #[test]
    fn test_default_model() {
        let provider = AnthropicProvider::new("test-key");
        let models = provider.available_models();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].id, DEFAULT_MODEL);
    }

    #[test]
    fn test_with_model_override() {
        let provider = AnthropicProvider::new("key").with_model("claude-3-5-haiku-20241022");
        assert_eq!(provider.available_models()[0].id, "claude-3-5-haiku-20241022");
    }

    #[test]
    fn test_parse_sse_text_delta() {
        let event = "event: content_block_delta\ndata: {\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hello\"}}";
        match parse_sse_event(event) {
            Some(SseEvent::Token(token)) => assert_eq!(token, "Hello"),
            _ => panic!("expected token event"),
        }
    }

    #[test]
    fn test_parse_sse_message_stop() {
        let event = "event: message_stop\ndata: {}";
        assert!(matches!(parse_sse_event(event), Some(SseEvent::Stop)));
    }

    #[test]
    fn test_parse_sse_error() {
        let event = "event: error\ndata: {\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}";
        match parse_sse_event(event) {
            Some(SseEvent::Error(message)) => assert_eq!(message, "Overloaded"),
            _ => panic!("expected error event"),
        }
    }

    #[test]
    fn test_parse_sse_ignores_ping() {
        let event = "event: ping\ndata: {}";
        assert!(parse_sse_event(event).is_none());
    }

    #[test]
    fn test_parse_error_authentication() {
        let provider = AnthropicProvider::new("bad-key");
        let body = r#"{"error":{"type":"authentication_error","message":"invalid key"}}"#;
        let err = provider.parse_error(401, body);
        assert!(matches!(
            err,
            NexusError::Api(ApiError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_parse_error_rate_limit() {
        let provider = AnthropicProvider::new("key");
        let body = r#"{"error":{"type":"rate_limit_error","message":"slow down"}}"#;
        let err = provider.parse_error(429, body);
        assert!(matches!(err, NexusError::Api(ApiError::RateLimited(_))));
    }

    #[test]
    fn test_parse_error_unstructured_body() {
        let provider = AnthropicProvider::new("key");
        let err = provider.parse_error(502, "bad gateway");
        match err {
            NexusError::Api(ApiError::ServerError { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "bad gateway");
            }
            _ => panic!("expected server error"),
        }
    }
}
