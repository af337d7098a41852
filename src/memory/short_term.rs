// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Short-term memory over an Upstash-style Redis REST API
//!
//! A rolling window of recent turns per user, capped at
//! [`MAX_ENTRIES`] entries with a TTL on the whole key. Unconfigured or
//! unreachable stores degrade to empty context.

use reqwest::Client;
use tracing::{debug, error, warn};

use crate::memory::{MemoryEntry, Role};

/// Sliding-window size per user
pub const MAX_ENTRIES: usize = 20;

/// Key TTL, 24 hours
pub const TTL_SECONDS: u64 = 86_400;

#[derive(Debug, Clone)]
struct RedisConfig {
    base_url: String,
    token: String,
}

/// Redis-REST-backed rolling conversation window
#[derive(Clone)]
pub struct ShortTermMemory {
    client: Client,
    config: Option<RedisConfig>,
}

impl ShortTermMemory {
    /// Create from optional endpoint config. Missing config disables
    /// the store.
    pub fn new(url: Option<String>, token: Option<String>) -> Self {
        let config = match (url, token) {
            (Some(base_url), Some(token)) => Some(RedisConfig { base_url, token }),
            _ => {
                warn!("Redis REST not configured, short-term memory disabled");
                None
            }
        };
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Disabled store (empty recalls, no-op writes)
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            config: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    fn key(user_id: &str) -> String {
        format!("stm:{user_id}")
    }

    /// Retrieve recent turns as `[role]: content` lines, newest first.
    /// Returns an empty string on miss or store failure; never errors.
    pub async fn recall(&self, user_id: &str) -> String {
        let Some(config) = &self.config else {
            return String::new();
        };

        let start = std::time::Instant::now();
        let url = format!(
            "{}/lrange/{}/0/{}",
            config.base_url,
            Self::key(user_id),
            MAX_ENTRIES - 1
        );

        let raw: Vec<String> = match self.fetch_range(config, &url).await {
            Ok(items) => items,
            Err(err) => {
                error!(error = %err, "failed to retrieve short-term memory");
                return String::new();
            }
        };

        debug!(
            user_id,
            entries = raw.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "short-term memory retrieved"
        );

        raw.iter()
            .filter_map(|item| serde_json::from_str::<MemoryEntry>(item).ok())
            .map(|e| {
                let text = e.summary.unwrap_or(e.content);
                format!("[{}]: {text}", e.role)
            })
            .collect::<Vec<String>>()
            .join("\n")
    }

    async fn fetch_range(
        &self,
        config: &RedisConfig,
        url: &str,
    ) -> Result<Vec<String>, crate::error::NexusError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&config.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(crate::error::NexusError::Memory(format!(
                "redis returned {}",
                response.status().as_u16()
            )));
        }

        let json: serde_json::Value = response.json().await?;
        Ok(json["result"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Append a turn, trim the window and refresh the TTL.
    /// Failures are logged, never propagated.
    pub async fn remember(&self, user_id: &str, role: Role, content: &str) {
        let Some(config) = &self.config else {
            return;
        };

        let entry = MemoryEntry::new(role, content);
        let entry_json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(err) => {
                error!(error = %err, "failed to serialize memory entry");
                return;
            }
        };

        let key = Self::key(user_id);
        let commands = serde_json::json!([
            ["LPUSH", key, entry_json],
            ["LTRIM", key, "0", (MAX_ENTRIES - 1).to_string()],
            ["EXPIRE", key, TTL_SECONDS.to_string()],
        ]);

        let result = self
            .client
            .post(format!("{}/pipeline", config.base_url))
            .bearer_auth(&config.token)
            .json(&commands)
            .send()
            .await;

        match result {
            Ok(response) if !response.status().is_success() => {
                error!(
                    status = response.status().as_u16(),
                    "failed to save short-term memory"
                );
            }
            Ok(_) => {}
            Err(err) => {
                error!(error = %err, "failed to save short-term memory");
            }
        }
    }

    /// Drop all recent turns for a user
    pub async fn clear(&self, user_id: &str) {
        let Some(config) = &self.config else {
            return;
        };

        let command = serde_json::json!(["DEL", Self::key(user_id)]);
        let result = self
            .client
            .post(&config.base_url)
            .bearer_auth(&config.token)
            .json(&command)
            .send()
            .await;

        if let Err(err) = result {
            error!(error = %err, "failed to clear short-term memory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_recall_is_empty() {
        let memory = ShortTermMemory::disabled();
        assert_eq!(memory.recall("user-1").await, "");
    }

    #[tokio::test]
    async fn test_disabled_remember_is_noop() {
        let memory = ShortTermMemory::disabled();
        memory.remember("user-1", Role::User, "hello").await;
    }

    #[test]
    fn test_missing_config_disables() {
        let memory = ShortTermMemory::new(Some("http://localhost".to_string()), None);
        assert!(!memory.is_configured());
    }

    #[test]
    fn test_key_format() {
        assert_eq!(ShortTermMemory::key("abc"), "stm:abc");
    }
}
