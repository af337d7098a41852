// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Plugin tools
//!
//! A plugin wraps an arbitrary external HTTP endpoint as a tool. The
//! endpoint receives `{query, extras}` as JSON and must respond with
//! JSON; whatever it returns becomes the tool result's `data`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::error;

use crate::error::{NexusError, Result};
use crate::tools::{Tool, ToolParams, ToolResult};

const DEFAULT_PLUGIN_TIMEOUT_MS: u64 = 5000;

/// Manifest describing an external plugin tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Unique plugin id (registry key is `plugin:<id>`)
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Description shown in tool listings
    pub description: String,

    /// Plugin version string
    pub version: String,

    /// Author attribution
    pub author: String,

    /// HTTP endpoint that handles tool calls
    pub endpoint: String,

    /// Keywords that pull this plugin into a dispatch
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Per-invocation timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Advisory cache TTL in seconds
    #[serde(default)]
    pub cache_ttl: Option<u64>,
}

impl PluginManifest {
    /// Registry id for this manifest
    pub fn tool_id(&self) -> String {
        Self::tool_id_for(&self.id)
    }

    /// Registry id for a manifest id
    pub fn tool_id_for(id: &str) -> String {
        format!("plugin:{id}")
    }

    /// Validate required fields
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(NexusError::Plugin("plugin id cannot be empty".to_string()));
        }
        if !self
            .id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(NexusError::Plugin(format!(
                "plugin id '{}' must contain only alphanumerics, '_' or '-'",
                self.id
            )));
        }
        if self.name.is_empty() {
            return Err(NexusError::Plugin("plugin name cannot be empty".to_string()));
        }
        if self.endpoint.is_empty() {
            return Err(NexusError::Plugin(
                "plugin endpoint cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct PluginRequest<'a> {
    query: &'a str,
    extras: &'a std::collections::HashMap<String, String>,
}

/// Tool backed by a plugin's HTTP endpoint
pub struct PluginTool {
    manifest: PluginManifest,
    tool_id: String,
    client: Client,
}

impl PluginTool {
    /// Create a tool from a manifest
    pub fn new(manifest: PluginManifest) -> Self {
        let tool_id = manifest.tool_id();
        Self {
            manifest,
            tool_id,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Tool for PluginTool {
    fn id(&self) -> &str {
        &self.tool_id
    }

    fn name(&self) -> &str {
        &self.manifest.name
    }

    fn description(&self) -> &str {
        &self.manifest.description
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.manifest.timeout_ms.unwrap_or(DEFAULT_PLUGIN_TIMEOUT_MS))
    }

    fn cache_ttl(&self) -> u64 {
        self.manifest.cache_ttl.unwrap_or(0)
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&self.manifest.endpoint)
            .json(&PluginRequest {
                query: &params.query,
                extras: &params.extras,
            })
            .send()
            .await
            .map_err(|e| {
                error!(plugin = %self.manifest.id, error = %e, "plugin request failed");
                NexusError::ToolExecution(format!("plugin {}: {e}", self.manifest.id))
            })?;

        if !response.status().is_success() {
            return Err(NexusError::ToolExecution(format!(
                "plugin {} returned {}",
                self.manifest.id,
                response.status().as_u16()
            )));
        }

        let data: serde_json::Value = response.json().await?;

        Ok(ToolResult::new(
            data,
            format!("{} (Plugin)", self.manifest.name),
            start.elapsed().as_millis() as u64,
        ))
    }
}
