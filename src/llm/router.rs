// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Tier-based provider routing
//!
//! Pro tier attempts the more capable provider first and falls back to
//! the baseline on construction absence or request-start failure. Free
//! tier uses the baseline only. Fallthrough happens only on failures to
//! start a stream; an already-started stream that errors mid-flight
//! surfaces that error to the caller unchanged.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{ApiError, NexusError, Result};
use crate::llm::provider::{ChatOptions, LlmProvider, TokenStream};
use crate::llm::providers::{AnthropicProvider, GroqProvider};

/// User service level governing provider choice and output budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Pro,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Free => write!(f, "free"),
            Tier::Pro => write!(f, "pro"),
        }
    }
}

/// Routes streaming requests to the best available provider
pub struct LlmRouter {
    anthropic: Option<Arc<dyn LlmProvider>>,
    groq: Option<Arc<dyn LlmProvider>>,
}

impl LlmRouter {
    /// Build a router from configured providers
    pub fn new(
        anthropic: Option<Arc<dyn LlmProvider>>,
        groq: Option<Arc<dyn LlmProvider>>,
    ) -> Self {
        Self { anthropic, groq }
    }

    /// Build providers from settings; unconfigured providers are
    /// simply absent.
    pub fn from_settings(settings: &Settings) -> Self {
        let anthropic = settings.providers.anthropic.resolve_api_key().map(|key| {
            let provider = match &settings.providers.anthropic.base_url {
                Some(base_url) => AnthropicProvider::with_base_url(key, base_url),
                None => AnthropicProvider::new(key),
            }
            .with_model(&settings.providers.anthropic.model);
            Arc::new(provider) as Arc<dyn LlmProvider>
        });

        let groq = settings.providers.groq.resolve_api_key().map(|key| {
            let provider = match &settings.providers.groq.base_url {
                Some(base_url) => GroqProvider::with_base_url(key, base_url),
                None => GroqProvider::new(key),
            }
            .with_model(&settings.providers.groq.model);
            Arc::new(provider) as Arc<dyn LlmProvider>
        });

        Self { anthropic, groq }
    }

    /// Whether any provider is configured
    pub fn has_providers(&self) -> bool {
        self.anthropic.is_some() || self.groq.is_some()
    }

    /// List configured models as "model (provider)" labels
    pub fn available_models(&self) -> Vec<String> {
        let mut models = Vec::new();
        if let Some(groq) = &self.groq {
            for info in groq.available_models() {
                models.push(format!("{} (Groq)", info.id));
            }
        }
        if let Some(anthropic) = &self.anthropic {
            for info in anthropic.available_models() {
                models.push(format!("{} (Anthropic)", info.id));
            }
        }
        models
    }

    /// Start a streaming completion for the given tier.
    ///
    /// Fails fast with [`ApiError::NoProviderAvailable`] when nothing
    /// is configured; never hangs.
    pub async fn stream(&self, options: ChatOptions, tier: Tier) -> Result<TokenStream> {
        if tier == Tier::Pro {
            if let Some(anthropic) = &self.anthropic {
                info!("using Anthropic for pro tier");
                match anthropic.stream_chat(options.clone()).await {
                    Ok(stream) => return Ok(stream),
                    Err(err) => {
                        warn!(error = %err, "Anthropic failed, falling back to Groq");
                    }
                }
            }
        }

        let groq = self
            .groq
            .as_ref()
            .ok_or(NexusError::Api(ApiError::NoProviderAvailable))?;
        groq.stream_chat(options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock_provider::MockProvider;
    use futures::StreamExt;

    fn provider(tokens: &[&str]) -> Arc<dyn LlmProvider> {
        Arc::new(MockProvider::new().with_tokens(tokens))
    }

    async fn collect(mut stream: TokenStream) -> Vec<String> {
        let mut tokens = Vec::new();
        while let Some(chunk) = stream.next().await {
            tokens.push(chunk.unwrap().token);
        }
        tokens
    }

    #[tokio::test]
    async fn test_no_providers_fails_fast() {
        let router = LlmRouter::new(None, None);
        let err = match router.stream(ChatOptions::new("s", "u"), Tier::Free).await {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert!(matches!(
            err,
            NexusError::Api(ApiError::NoProviderAvailable)
        ));
    }

    #[tokio::test]
    async fn test_free_tier_uses_groq() {
        let router = LlmRouter::new(Some(provider(&["a"])), Some(provider(&["b"])));
        let stream = router
            .stream(ChatOptions::new("s", "u"), Tier::Free)
            .await
            .unwrap();
        assert_eq!(collect(stream).await, vec!["b"]);
    }

    #[tokio::test]
    async fn test_pro_tier_prefers_anthropic() {
        let router = LlmRouter::new(Some(provider(&["a"])), Some(provider(&["b"])));
        let stream = router
            .stream(ChatOptions::new("s", "u"), Tier::Pro)
            .await
            .unwrap();
        assert_eq!(collect(stream).await, vec!["a"]);
    }

    #[tokio::test]
    async fn test_pro_tier_falls_back_when_anthropic_absent() {
        let router = LlmRouter::new(None, Some(provider(&["b"])));
        let stream = router
            .stream(ChatOptions::new("s", "u"), Tier::Pro)
            .await
            .unwrap();
        assert_eq!(collect(stream).await, vec!["b"]);
    }

    #[tokio::test]
    async fn test_pro_tier_falls_back_on_start_failure() {
        let failing: Arc<dyn LlmProvider> = Arc::new(MockProvider::new().with_start_failure());
        let router = LlmRouter::new(Some(failing), Some(provider(&["b"])));
        let stream = router
            .stream(ChatOptions::new("s", "u"), Tier::Pro)
            .await
            .unwrap();
        assert_eq!(collect(stream).await, vec!["b"]);
    }

    #[test]
    fn test_available_models_empty() {
        let router = LlmRouter::new(None, None);
        assert!(router.available_models().is_empty());
        assert!(!router.has_providers());
    }

    #[test]
    fn test_available_models_labels() {
        let router = LlmRouter::new(Some(provider(&["a"])), Some(provider(&["b"])));
        let models = router.available_models();
        assert_eq!(models.len(), 2);
        assert!(models.iter().any(|m| m.contains("(Groq)")));
        assert!(models.iter().any(|m| m.contains("(Anthropic)")));
    }
}
