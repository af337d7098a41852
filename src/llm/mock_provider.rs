// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Mock LLM provider for testing
//!
//! Provides a configurable scripted implementation of the LlmProvider
//! trait that can be used in tests without making real API calls.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{ApiError, NexusError, Result};
use crate::llm::provider::{ChatOptions, LlmProvider, ModelInfo, TokenChunk, TokenStream};

/// A mock LLM provider for testing
#[derive(Clone)]
pub struct MockProvider {
    /// Provider name
    name: String,
    /// Tokens to emit per stream
    tokens: Vec<String>,
    /// Fail before emitting anything
    fail_on_start: bool,
    /// Emit a stream error after this many tokens
    error_after: Option<usize>,
    /// Call counter
    call_count: Arc<AtomicUsize>,
    /// Recorded requests
    recorded_requests: Arc<Mutex<Vec<ChatOptions>>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a mock that emits nothing and succeeds
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            tokens: Vec::new(),
            fail_on_start: false,
            error_after: None,
            call_count: Arc::new(AtomicUsize::new(0)),
            recorded_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider with a custom name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Script the tokens each stream emits
    pub fn with_tokens(mut self, tokens: &[&str]) -> Self {
        self.tokens = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Script the full response as whitespace-joined tokens
    pub fn with_response(mut self, text: &str) -> Self {
        self.tokens = text.split_whitespace().map(|t| format!("{t} ")).collect();
        self
    }

    /// Fail every stream before the first token
    pub fn with_start_failure(mut self) -> Self {
        self.fail_on_start = true;
        self
    }

    /// Emit a stream-level error after `count` tokens
    pub fn with_error_after(mut self, count: usize) -> Self {
        self.error_after = Some(count);
        self
    }

    /// Number of stream_chat calls made
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get the last request made
    pub fn last_request(&self) -> Option<ChatOptions> {
        let requests = match self.recorded_requests.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        requests.last().cloned()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".to_string(),
            display_name: "Mock Model".to_string(),
            context_window: 128_000,
            max_output_tokens: 8_192,
        }]
    }

    async fn stream_chat(&self, options: ChatOptions) -> Result<TokenStream> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        {
            let mut requests = match self.recorded_requests.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            requests.push(options);
        }

        if self.fail_on_start {
            return Err(NexusError::Api(ApiError::Network(
                "mock start failure".to_string(),
            )));
        }

        let mut items: Vec<Result<TokenChunk>> = self
            .tokens
            .iter()
            .map(|token| {
                Ok(TokenChunk {
                    token: token.clone(),
                    model_id: "mock-model".to_string(),
                })
            })
            .collect();

        if let Some(after) = self.error_after {
            items.truncate(after);
            items.push(Err(NexusError::Api(ApiError::StreamError(
                "mock mid-stream failure".to_string(),
            ))));
        }

        Ok(Box::pin(futures::stream::iter(items)))
    }
}
