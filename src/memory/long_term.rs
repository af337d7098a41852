// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Long-term memory over a vector REST store
//!
//! Persisted user facts indexed by a 384-dimension hash-based
//! pseudo-embedding. The embedding is deliberately approximate; it
//! enables basic similarity search without shipping a model. Recall
//! queries the store's `match_memories` RPC, persistence inserts into
//! the `memories` table.

use reqwest::Client;
use tracing::{debug, error, warn};

use crate::memory::MemoryType;

const EMBEDDING_DIM: usize = 384;
const MATCH_THRESHOLD: f64 = 0.5;
const MATCH_COUNT: u32 = 5;

/// Generate an L2-normalized hash-based pseudo-embedding.
pub fn generate_embedding(text: &str) -> Vec<f64> {
    let mut embedding = vec![0.0_f64; EMBEDDING_DIM];
    let lower = text.to_lowercase();

    for (i, c) in lower.chars().enumerate() {
        let idx = (c as usize).wrapping_mul(i + 1) % EMBEDDING_DIM;
        embedding[idx] += 1.0;
    }

    let magnitude = embedding.iter().map(|v| v * v).sum::<f64>().sqrt();
    if magnitude > 0.0 {
        for v in &mut embedding {
            *v /= magnitude;
        }
    }

    embedding
}

#[derive(Debug, Clone)]
struct VectorConfig {
    base_url: String,
    service_key: String,
}

/// Vector-REST-backed fact store
#[derive(Clone)]
pub struct LongTermMemory {
    client: Client,
    config: Option<VectorConfig>,
}

impl LongTermMemory {
    /// Create from optional endpoint config. Missing config disables
    /// the store.
    pub fn new(url: Option<String>, service_key: Option<String>) -> Self {
        let config = match (url, service_key) {
            (Some(base_url), Some(service_key)) => Some(VectorConfig {
                base_url,
                service_key,
            }),
            _ => {
                warn!("vector store not configured, long-term memory disabled");
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

    /// Retrieve facts similar to the query as `- [type] content` lines.
    /// Returns an empty string on miss or store failure; never errors.
    pub async fn recall(&self, user_id: &str, query: &str) -> String {
        let Some(config) = &self.config else {
            return String::new();
        };

        let start = std::time::Instant::now();
        let body = serde_json::json!({
            "query_embedding": generate_embedding(query),
            "match_user_id": user_id,
            "match_threshold": MATCH_THRESHOLD,
            "match_count": MATCH_COUNT,
        });

        let response = self
            .client
            .post(format!("{}/rest/v1/rpc/match_memories", config.base_url))
            .header("apikey", &config.service_key)
            .bearer_auth(&config.service_key)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(err) => {
                error!(error = %err, "long-term memory error");
                return String::new();
            }
        };

        if !response.status().is_success() {
            warn!(
                status = response.status().as_u16(),
                "long-term memory query failed"
            );
            return String::new();
        }

        let memories: Vec<serde_json::Value> = match response.json().await {
            Ok(m) => m,
            Err(err) => {
                error!(error = %err, "long-term memory error");
                return String::new();
            }
        };

        debug!(
            user_id,
            count = memories.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "long-term memory retrieved"
        );

        memories
            .iter()
            .map(|m| {
                format!(
                    "- [{}] {}",
                    m["memory_type"].as_str().unwrap_or("fact"),
                    m["content"].as_str().unwrap_or("")
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }

    /// Persist a fact with its embedding. Failures are logged, never
    /// propagated.
    pub async fn persist(
        &self,
        user_id: &str,
        content: &str,
        memory_type: MemoryType,
        importance: f64,
    ) {
        let Some(config) = &self.config else {
            return;
        };

        let body = serde_json::json!({
            "user_id": user_id,
            "content": content,
            "embedding": generate_embedding(content),
            "memory_type": memory_type.to_string(),
            "importance": importance,
        });

        let result = self
            .client
            .post(format!("{}/rest/v1/memories", config.base_url))
            .header("apikey", &config.service_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(&config.service_key)
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if !response.status().is_success() => {
                warn!(
                    status = response.status().as_u16(),
                    "failed to save long-term memory"
                );
            }
            Ok(_) => {}
            Err(err) => {
                error!(error = %err, "long-term memory save error");
            }
        }
    }
}
