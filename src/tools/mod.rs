// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Data-fetch tools
//!
//! Each tool wraps one external data source behind a uniform fetch
//! contract. The registry owns the set of available tools and executes
//! the subset relevant to a query concurrently, with per-tool timeouts
//! and graceful degradation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::Result;

pub mod builtin;
pub mod plugin;
pub mod registry;

pub use plugin::{PluginManifest, PluginTool};
pub use registry::ToolRegistry;

/// Parameters passed to a tool invocation
#[derive(Debug, Clone, Default)]
pub struct ToolParams {
    /// The raw user query
    pub query: String,

    /// Optional explicit token symbol
    pub symbol: Option<String>,

    /// Free-form extras forwarded to plugin tools
    pub extras: HashMap<String, String>,
}

impl ToolParams {
    /// Create params for a query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            symbol: None,
            extras: HashMap::new(),
        }
    }
}

/// Output of one tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Fetched payload, shape depends on the source
    pub data: serde_json::Value,

    /// Human-readable source label
    pub source: String,

    /// Fetch time, unix millis
    pub timestamp: i64,

    /// Wall-clock fetch latency
    pub latency_ms: u64,

    /// Whether the payload was served from a cache
    pub cached: bool,
}

impl ToolResult {
    /// Create a result stamped with the current time
    pub fn new(data: serde_json::Value, source: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            data,
            source: source.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            latency_ms,
            cached: false,
        }
    }
}

/// A data-fetch adapter wrapping one external source
#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable identifier, used as the registry key
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Description shown in tool listings
    fn description(&self) -> &str;

    /// Per-invocation timeout; exceeding it fails this tool only
    fn timeout(&self) -> Duration {
        Duration::from_millis(5000)
    }

    /// Advisory cache TTL in seconds (0 = uncacheable)
    fn cache_ttl(&self) -> u64 {
        0
    }

    /// Fetch data for the given params
    async fn execute(&self, params: &ToolParams) -> Result<ToolResult>;
}
