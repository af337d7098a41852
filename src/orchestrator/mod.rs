// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Request orchestration
//!
//! The top-level pipeline for one chat request: classify intent, fan
//! out tool dispatch and memory reads concurrently, assemble the
//! prompt under the token budget, stream the response from the routed
//! provider (or the demo-mode responder when none is configured), and
//! persist the exchange to memory off the response path.
//!
//! Event ordering per request is strict: zero or more `tool_result`
//! events, then zero or more `token` events in generation order, then
//! exactly one terminal `done` or `error`. Nothing is emitted after
//! the terminal event. Cancellation is dropping the stream; in-flight
//! fire-and-forget persistence may still complete.

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Settings;
use crate::fallback::fallback_response;
use crate::intent;
use crate::llm::provider::ChatOptions;
use crate::llm::router::{LlmRouter, Tier};
use crate::memory::{should_persist, LongTermMemory, MemoryContext, Role, ShortTermMemory};
use crate::prompt::{self, Mode};
use crate::tools::ToolRegistry;

/// Inter-token delay for demo-mode streaming
const DEMO_TOKEN_DELAY: Duration = Duration::from_millis(20);

/// Generic user-facing message for provider failures; internal detail
/// stays in the logs
const GENERATION_FAILED_MESSAGE: &str =
    "Sorry, I couldn't generate a response. Please try again.";

/// The wire-level unit streamed to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// One incremental token of the response
    Token { content: String },

    /// One tool's fetched data, emitted before any token
    ToolResult {
        tool: String,
        data: serde_json::Value,
    },

    /// Terminal failure; no events follow
    Error { content: String },

    /// Terminal success; no events follow
    Done,
}

/// One chat request, owned by a single in-flight orchestration
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
    pub mode: Mode,
    pub tier: Tier,
}

impl ChatRequest {
    /// Create a request with default mode and tier
    pub fn new(message: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user_id: user_id.into(),
            mode: Mode::default(),
            tier: Tier::default(),
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }
}

/// Sequences classification, fetch, generation and persistence for
/// every request. Cheap to clone; all fields are shared handles.
#[derive(Clone)]
pub struct Orchestrator {
    registry: ToolRegistry,
    router: Arc<LlmRouter>,
    short_term: ShortTermMemory,
    long_term: LongTermMemory,
    max_input_tokens: usize,
    free_max_output_tokens: u32,
    pro_max_output_tokens: u32,
}

impl Orchestrator {
    pub fn new(
        registry: ToolRegistry,
        router: Arc<LlmRouter>,
        short_term: ShortTermMemory,
        long_term: LongTermMemory,
        settings: &Settings,
    ) -> Self {
        Self {
            registry,
            router,
            short_term,
            long_term,
            max_input_tokens: settings.limits.max_input_tokens,
            free_max_output_tokens: settings.limits.free_max_output_tokens,
            pro_max_output_tokens: settings.limits.pro_max_output_tokens,
        }
    }

    /// Build a full stack from settings: registry with built-ins,
    /// router and memory stores from configured endpoints.
    pub fn from_settings(settings: &Settings) -> Self {
        let router = Arc::new(LlmRouter::from_settings(settings));
        let short_term = ShortTermMemory::new(
            settings.memory.redis.resolve_url(),
            settings.memory.redis.resolve_token(),
        );
        let long_term = LongTermMemory::new(
            settings.memory.vector.resolve_url(),
            settings.memory.vector.resolve_service_key(),
        );
        Self::new(ToolRegistry::new(), router, short_term, long_term, settings)
    }

    /// Shared tool registry handle (for listings and plugin management)
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Shared router handle (for model listings)
    pub fn router(&self) -> &Arc<LlmRouter> {
        &self.router
    }

    fn max_output_tokens(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Free => self.free_max_output_tokens,
            Tier::Pro => self.pro_max_output_tokens,
        }
    }

    /// Run one request to completion, emitting the event stream.
    ///
    /// Dropping the returned stream cancels the request and releases
    /// the provider connection; persistence tasks already spawned run
    /// to completion best-effort.
    pub fn run(&self, request: ChatRequest) -> impl Stream<Item = ChatEvent> + Send + 'static {
        let this = self.clone();

        async_stream::stream! {
            let request_id = Uuid::new_v4();
            let start = std::time::Instant::now();
            let ChatRequest { message, user_id, mode, tier } = request;

            let intent = intent::classify(&message);
            info!(
                %request_id,
                user_id,
                hints = intent.tool_hints.len(),
                complexity = ?intent.complexity,
                "intent classified"
            );

            // Tool dispatch and both memory reads settle together
            // before prompt assembly; each fails soft on its own.
            let (tool_results, short_term_context, long_term_context) = tokio::join!(
                async {
                    if intent.needs_tools {
                        this.registry.dispatch(&intent.tool_hints, &message).await
                    } else {
                        Vec::new()
                    }
                },
                this.short_term.recall(&user_id),
                this.long_term.recall(&user_id, &message),
            );

            for result in &tool_results {
                yield ChatEvent::ToolResult {
                    tool: result.source.clone(),
                    data: result.data.clone(),
                };
            }

            let full_response = if this.router.has_providers() {
                let memory = MemoryContext {
                    short_term: short_term_context,
                    long_term: long_term_context,
                };
                let built = prompt::build(
                    &message,
                    mode,
                    &memory,
                    &tool_results,
                    this.max_input_tokens,
                );
                let options = ChatOptions::new(built.system, built.user)
                    .with_max_tokens(this.max_output_tokens(tier));

                let mut stream = match this.router.stream(options, tier).await {
                    Ok(stream) => stream,
                    Err(err) => {
                        error!(%request_id, error = %err, "LLM streaming failed");
                        yield ChatEvent::Error {
                            content: GENERATION_FAILED_MESSAGE.to_string(),
                        };
                        return;
                    }
                };

                let mut full_response = String::new();
                while let Some(chunk) = stream.next().await {
                    match chunk {
                        Ok(chunk) => {
                            full_response.push_str(&chunk.token);
                            yield ChatEvent::Token { content: chunk.token };
                        }
                        Err(err) => {
                            error!(%request_id, error = %err, "LLM streaming failed");
                            yield ChatEvent::Error {
                                content: GENERATION_FAILED_MESSAGE.to_string(),
                            };
                            return;
                        }
                    }
                }
                full_response
            } else {
                // Demo mode: stream the deterministic responder word by
                // word to preserve the event contract.
                let response = fallback_response(&message, &tool_results, mode);
                let mut streamed = String::new();
                for word in response.split_whitespace() {
                    let token = format!("{word} ");
                    streamed.push_str(&token);
                    yield ChatEvent::Token { content: token };
                    tokio::time::sleep(DEMO_TOKEN_DELAY).await;
                }
                streamed
            };

            this.spawn_persistence(&user_id, &message, full_response);

            info!(
                %request_id,
                user_id,
                total_latency_ms = start.elapsed().as_millis() as u64,
                tools_used = tool_results.len(),
                "request completed"
            );

            yield ChatEvent::Done;
        }
    }

    /// Persist the exchange off the response path. Failures are logged
    /// inside the store interfaces; nothing blocks the terminal event.
    fn spawn_persistence(&self, user_id: &str, message: &str, full_response: String) {
        let short_term = self.short_term.clone();
        let long_term = self.long_term.clone();
        let user_id = user_id.to_string();
        let message = message.to_string();

        tokio::spawn(async move {
            short_term.remember(&user_id, Role::User, &message).await;
            short_term
                .remember(&user_id, Role::Assistant, &full_response)
                .await;

            // Long-term persistence is decided on the user's message only
            let decision = should_persist(&message);
            if decision.should {
                long_term
                    .persist(&user_id, &message, decision.memory_type, decision.importance)
                    .await;
            }
        });
    }
}

/// Validate an inbound message before orchestration starts
pub fn validate_message(message: &str) -> Result<&str, &'static str> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err("Message is required");
    }
    if trimmed.len() > 2000 {
        return Err("Message too long (max 2000 chars)");
    }
    Ok(trimmed)
}
