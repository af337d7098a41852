// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Groq API provider implementation
//!
//! OpenAI-compatible chat completions endpoint, streamed as
//! `data: <json>` lines terminated by `data: [DONE]`.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, NexusError, Result};
use crate::llm::provider::{ChatOptions, LlmProvider, ModelInfo, TokenChunk, TokenStream};

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Groq provider
pub struct GroqProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GroqProvider {
    /// Create a new Groq provider
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: GROQ_API_URL.to_string(),
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

    fn parse_error(&self, status: u16, body: &str) -> NexusError {
        match status {
            401 => NexusError::Api(ApiError::AuthenticationFailed),
            429 => NexusError::Api(ApiError::RateLimited(10)),
            404 => NexusError::Api(ApiError::ModelNotFound(self.model.clone())),
            _ => NexusError::Api(ApiError::ServerError {
                status,
                message: body.to_string(),
            }),
        }
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: self.model.clone(),
            display_name: "Llama 3.3 70B".to_string(),
            context_window: 128_000,
            max_output_tokens: 32_768,
        }]
    }

    async fn stream_chat(&self, options: ChatOptions) -> Result<TokenStream> {
        let body = GroqRequest {
            model: self.model.clone(),
            messages: vec![
                GroqMessage {
                    role: "system".to_string(),
                    content: options.system,
                },
                GroqMessage {
                    role: "user".to_string(),
                    content: options.user,
                },
            ],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            stream: true,
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
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

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim().to_string();
                    *buffer = buffer[line_end + 1..].to_string();

                    let Some(data) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    if data == "[DONE]" {
                        continue;
                    }

                    if let Some(token) = parse_chunk_token(data) {
                        items.push(Ok(TokenChunk {
                            token,
                            model_id: model_id.clone(),
                        }));
                    }
                }

                futures::future::ready(Some(items))
            })
            .flat_map(futures::stream::iter);

        Ok(Box::pin(token_stream))
    }
}

/// Extract the delta content from one OpenAI-style chunk
fn parse_chunk_token(data: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(data).ok()?;
    let content = parsed["choices"][0]["delta"]["content"].as_str()?;
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

// Groq API types (OpenAI-compatible)

#[derive(Debug, Serialize)]
struct GroqRequest {
    model: String,
    messages: Vec<GroqMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct GroqMessage {
    role: String,
    content: String,
}
