// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Crypto Fear & Greed Index from Alternative.me

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::{NexusError, Result};
use crate::tools::{Tool, ToolParams, ToolResult};

const ALTERNATIVE_ME_API_URL: &str = "https://api.alternative.me";

pub struct FearGreedTool {
    client: Client,
    base_url: String,
}

impl FearGreedTool {
    pub fn new() -> Self {
        Self::with_base_url(ALTERNATIVE_ME_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for FearGreedTool {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(value: i64) -> &'static str {
    match value {
        i64::MIN..=25 => "Extreme Fear — investors are very worried, potential buying opportunity",
        26..=45 => "Fear — market sentiment is negative",
        46..=55 => "Neutral — market sentiment is balanced",
        56..=75 => "Greed — investors are getting greedy, caution advised",
        _ => "Extreme Greed — market may be overheated, high risk of correction",
    }
}

#[async_trait]
impl Tool for FearGreedTool {
    fn id(&self) -> &str {
        "fear_greed"
    }

    fn name(&self) -> &str {
        "Fear & Greed Index"
    }

    fn description(&self) -> &str {
        "Get the current crypto Fear & Greed Index score and sentiment"
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(5000)
    }

    fn cache_ttl(&self) -> u64 {
        300
    }

    async fn execute(&self, _params: &ToolParams) -> Result<ToolResult> {
        let start = std::time::Instant::now();

        let url = format!("{}/fng/?limit=1&format=json", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(NexusError::ToolExecution(format!(
                "Fear & Greed API error: {}",
                response.status().as_u16()
            )));
        }
        let json: serde_json::Value = response.json().await?;

        let entry = &json["data"][0];
        let value = entry["value"]
            .as_str()
            .and_then(|v| v.parse::<i64>().ok())
            .or_else(|| entry["value"].as_i64())
            .unwrap_or(0);

        let data = serde_json::json!({
            "value": value,
            "label": entry["value_classification"],
            "timestamp": entry["timestamp"],
            "description": describe(value),
        });

        Ok(ToolResult::new(
            data,
            "Alternative.me Fear & Greed Index",
            start.elapsed().as_millis() as u64,
        ))
    }
}
