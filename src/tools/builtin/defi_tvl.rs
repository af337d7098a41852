// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! DeFi protocol TVL data from DefiLlama

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::{NexusError, Result};
use crate::tools::{Tool, ToolParams, ToolResult};

const DEFILLAMA_API_URL: &str = "https://api.llama.fi";

static PROTOCOL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(aave|uniswap|lido|makerdao|compound|curve|convex|eigenlayer|pendle|morpho|gmx|hyperliquid)\b")
        .expect("protocol pattern")
});

pub struct DefiTvlTool {
    client: Client,
    base_url: String,
}

impl DefiTvlTool {
    pub fn new() -> Self {
        Self::with_base_url(DEFILLAMA_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn fetch_protocol(&self, protocol: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}/protocol/{protocol}", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(NexusError::ToolExecution(format!(
                "DefiLlama API error: {}",
                response.status().as_u16()
            )));
        }
        let json: serde_json::Value = response.json().await?;

        let chains: Vec<serde_json::Value> = json["chains"]
            .as_array()
            .map(|c| c.iter().take(5).cloned().collect())
            .unwrap_or_default();

        Ok(serde_json::json!({
            "name": json["name"],
            "symbol": json["symbol"],
            "tvl": json["tvl"],
            "chain": json["chain"],
            "category": json["category"],
            "chains": chains,
            "change_1d": json["change_1d"],
            "change_7d": json["change_7d"],
            "mcap": json["mcap"],
        }))
    }

    async fn fetch_top_protocols(&self) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}/protocols", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(NexusError::ToolExecution(format!(
                "DefiLlama API error: {}",
                response.status().as_u16()
            )));
        }
        let protocols: Vec<serde_json::Value> = response.json().await?;

        let total_tvl: f64 = protocols
            .iter()
            .filter_map(|p| p["tvl"].as_f64())
            .sum();

        let top: Vec<serde_json::Value> = protocols
            .iter()
            .take(10)
            .map(|p| {
                serde_json::json!({
                    "name": p["name"],
                    "symbol": p["symbol"],
                    "tvl": p["tvl"],
                    "category": p["category"],
                    "change_1d": p["change_1d"],
                    "chain": p["chain"],
                })
            })
            .collect();

        Ok(serde_json::json!({
            "top_protocols": top,
            "total_tvl": total_tvl,
        }))
    }
}

impl Default for DefiTvlTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for DefiTvlTool {
    fn id(&self) -> &str {
        "defi_tvl"
    }

    fn name(&self) -> &str {
        "DeFi TVL"
    }

    fn description(&self) -> &str {
        "Get DeFi protocol TVL data, rankings, and trends"
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(5000)
    }

    fn cache_ttl(&self) -> u64 {
        60
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult> {
        let start = std::time::Instant::now();

        let data = match PROTOCOL_PATTERN.find(&params.query) {
            Some(m) => self.fetch_protocol(&m.as_str().to_lowercase()).await?,
            None => self.fetch_top_protocols().await?,
        };

        Ok(ToolResult::new(
            data,
            "DeFi Llama",
            start.elapsed().as_millis() as u64,
        ))
    }
}
