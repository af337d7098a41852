// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Web search via the Tavily API
//!
//! Degrades to an informative payload when no API key is configured so
//! a missing key never fails a dispatch.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::{NexusError, Result};
use crate::tools::{Tool, ToolParams, ToolResult};

const TAVILY_API_URL: &str = "https://api.tavily.com";
const TAVILY_API_KEY_ENV: &str = "TAVILY_API_KEY";

pub struct LiveSearchTool {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl LiveSearchTool {
    pub fn new() -> Self {
        Self::with_base_url(TAVILY_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: std::env::var(TAVILY_API_KEY_ENV).ok(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

impl Default for LiveSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for LiveSearchTool {
    fn id(&self) -> &str {
        "live_search"
    }

    fn name(&self) -> &str {
        "Live Search"
    }

    fn description(&self) -> &str {
        "Search the web for real-time information"
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(8000)
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult> {
        let start = std::time::Instant::now();

        let Some(api_key) = &self.api_key else {
            return Ok(ToolResult::new(
                serde_json::json!({"error": "Tavily API key not configured"}),
                "Tavily",
                start.elapsed().as_millis() as u64,
            ));
        };

        let body = serde_json::json!({
            "api_key": api_key,
            "query": params.query,
            "search_depth": "basic",
            "include_answer": true,
            "max_results": 5,
        });

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(NexusError::ToolExecution(format!(
                "Tavily API error: {}",
                response.status().as_u16()
            )));
        }
        let json: serde_json::Value = response.json().await?;

        let results: Vec<serde_json::Value> = json["results"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .take(5)
                    .map(|r| {
                        serde_json::json!({
                            "title": r["title"],
                            "url": r["url"],
                            "snippet": r["content"],
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let data = serde_json::json!({
            "answer": json["answer"],
            "results": results,
        });

        Ok(ToolResult::new(
            data,
            "Tavily Search",
            start.elapsed().as_millis() as u64,
        ))
    }
}
