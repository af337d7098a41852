// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Ethereum gas prices from the Etherscan gas oracle

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::{NexusError, Result};
use crate::tools::{Tool, ToolParams, ToolResult};

const ETHERSCAN_API_URL: &str = "https://api.etherscan.io";

pub struct GasTrackerTool {
    client: Client,
    base_url: String,
}

impl GasTrackerTool {
    pub fn new() -> Self {
        Self::with_base_url(ETHERSCAN_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for GasTrackerTool {
    fn default() -> Self {
        Self::new()
    }
}

fn recommend(avg_gas: f64) -> &'static str {
    if avg_gas < 10.0 {
        "Very low gas — excellent time for transactions"
    } else if avg_gas < 25.0 {
        "Low gas — good time for most transactions"
    } else if avg_gas < 50.0 {
        "Moderate gas — normal network activity"
    } else if avg_gas < 100.0 {
        "High gas — consider waiting for lower fees"
    } else {
        "Very high gas — network congestion, delay non-urgent transactions"
    }
}

fn parse_gwei(value: &serde_json::Value) -> f64 {
    value
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| value.as_f64())
        .unwrap_or(0.0)
}

#[async_trait]
impl Tool for GasTrackerTool {
    fn id(&self) -> &str {
        "gas_tracker"
    }

    fn name(&self) -> &str {
        "ETH Gas Tracker"
    }

    fn description(&self) -> &str {
        "Get current Ethereum gas prices and fee recommendations"
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(5000)
    }

    fn cache_ttl(&self) -> u64 {
        15
    }

    async fn execute(&self, _params: &ToolParams) -> Result<ToolResult> {
        let start = std::time::Instant::now();

        let url = format!("{}/api?module=gastracker&action=gasoracle", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(NexusError::ToolExecution(format!(
                "Etherscan API error: {}",
                response.status().as_u16()
            )));
        }
        let json: serde_json::Value = response.json().await?;
        let result = &json["result"];

        let average = parse_gwei(&result["ProposeGasPrice"]);
        let data = serde_json::json!({
            "low": parse_gwei(&result["SafeGasPrice"]),
            "average": average,
            "high": parse_gwei(&result["FastGasPrice"]),
            "base_fee": parse_gwei(&result["suggestBaseFee"]),
            "unit": "Gwei",
            "recommendation": recommend(average),
        });

        Ok(ToolResult::new(
            data,
            "Etherscan Gas Tracker",
            start.elapsed().as_millis() as u64,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_bands() {
        assert!(recommend(5.0).starts_with("Very low"));
        assert!(recommend(20.0).starts_with("Low"));
        assert!(recommend(40.0).starts_with("Moderate"));
        assert!(recommend(80.0).starts_with("High"));
        assert!(recommend(150.0).starts_with("Very high"));
    }

    #[test]
    fn test_parse_gwei_string_and_number() {
        assert_eq!(parse_gwei(&serde_json::json!("12.5")), 12.5);
        assert_eq!(parse_gwei(&serde_json::json!(12.5)), 12.5);
        assert_eq!(parse_gwei(&serde_json::json!(null)), 0.0);
    }
}
