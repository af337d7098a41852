// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! LLM provider trait and related types
//!
//! Defines the streaming-first abstraction layer for LLM backends.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::error::Result;

/// One incremental token from a streaming completion
#[derive(Debug, Clone, PartialEq)]
pub struct TokenChunk {
    /// Token text as emitted by the provider
    pub token: String,

    /// Model that produced the token
    pub model_id: String,
}

/// Streaming completion options
#[derive(Debug, Clone)]
pub struct ChatOptions {
    /// System prompt
    pub system: String,

    /// User message
    pub user: String,

    /// Maximum tokens in the response
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl ChatOptions {
    /// Create options with the default generation parameters
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Information about a model
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model identifier
    pub id: String,

    /// Human-readable name
    pub display_name: String,

    /// Maximum context window in tokens
    pub context_window: u32,

    /// Maximum output tokens
    pub max_output_tokens: u32,
}

/// Incremental token stream returned by a provider
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<TokenChunk>> + Send>>;

/// Main trait for streaming LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "anthropic", "groq")
    fn name(&self) -> &str;

    /// List available models
    fn available_models(&self) -> Vec<ModelInfo>;

    /// Start a streaming completion.
    ///
    /// Tokens surface incrementally as they arrive over the provider's
    /// chunked transport. An error starting the request is returned
    /// directly; a mid-stream failure is surfaced through the stream
    /// after any tokens already emitted.
    async fn stream_chat(&self, options: ChatOptions) -> Result<TokenStream>;
}
