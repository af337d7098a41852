// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! On-chain network stats for Ethereum and Bitcoin
//!
//! Uses Etherscan's stats endpoints for ETH supply/price and
//! Blockchain.com's public query API for BTC difficulty, hashrate and
//! block height. Per-network failures degrade to an error note inside
//! the payload rather than failing the whole tool.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use std::time::Duration;

use crate::error::Result;
use crate::tools::{Tool, ToolParams, ToolResult};

const ETHERSCAN_API_URL: &str = "https://api.etherscan.io";
const BLOCKCHAIN_INFO_URL: &str = "https://blockchain.info";

const WEI_PER_ETH: f64 = 1e18;

pub struct OnchainDataTool {
    client: Client,
    eth_base_url: String,
    btc_base_url: String,
}

impl OnchainDataTool {
    pub fn new() -> Self {
        Self::with_base_urls(ETHERSCAN_API_URL, BLOCKCHAIN_INFO_URL)
    }

    pub fn with_base_urls(
        eth_base_url: impl Into<String>,
        btc_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            eth_base_url: eth_base_url.into(),
            btc_base_url: btc_base_url.into(),
        }
    }

    async fn fetch_ethereum(&self) -> Result<serde_json::Value> {
        let supply: serde_json::Value = self
            .client
            .get(format!(
                "{}/api?module=stats&action=ethsupply",
                self.eth_base_url
            ))
            .send()
            .await?
            .json()
            .await?;

        let price: serde_json::Value = self
            .client
            .get(format!(
                "{}/api?module=stats&action=ethprice",
                self.eth_base_url
            ))
            .send()
            .await?
            .json()
            .await?;

        let total_supply = supply["result"]
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .map(|wei| wei / WEI_PER_ETH);

        let last_updated = price["result"]["ethusd_timestamp"]
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .and_then(|t| Utc.timestamp_opt(t, 0).single())
            .map(|t| t.to_rfc3339());

        Ok(serde_json::json!({
            "total_supply_eth": total_supply,
            "price_usd": parse_num(&price["result"]["ethusd"]),
            "price_btc": parse_num(&price["result"]["ethbtc"]),
            "last_updated": last_updated,
        }))
    }

    async fn fetch_bitcoin(&self) -> Result<serde_json::Value> {
        let difficulty = self.fetch_quantity("q/getdifficulty").await?;
        let hashrate = self.fetch_quantity("q/hashrate").await?;
        let block_height = self.fetch_quantity("q/getblockcount").await?;

        Ok(serde_json::json!({
            "difficulty": difficulty,
            "hashrate_ghs": hashrate,
            "block_height": block_height,
        }))
    }

    async fn fetch_quantity(&self, path: &str) -> Result<f64> {
        let text = self
            .client
            .get(format!("{}/{path}", self.btc_base_url))
            .send()
            .await?
            .text()
            .await?;
        Ok(text.trim().parse::<f64>().unwrap_or(0.0))
    }
}

fn parse_num(value: &serde_json::Value) -> Option<f64> {
    value
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| value.as_f64())
}

impl Default for OnchainDataTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for OnchainDataTool {
    fn id(&self) -> &str {
        "onchain_data"
    }

    fn name(&self) -> &str {
        "On-Chain Data"
    }

    fn description(&self) -> &str {
        "Get on-chain blockchain data: supply, hashrate, difficulty, block height"
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(5000)
    }

    fn cache_ttl(&self) -> u64 {
        120
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult> {
        let start = std::time::Instant::now();
        let query = params.query.to_lowercase();

        let mut data = serde_json::Map::new();

        if query.contains("eth") || query.contains("ethereum") || query.contains("chain") {
            match self.fetch_ethereum().await {
                Ok(eth) => {
                    data.insert("ethereum".to_string(), eth);
                }
                Err(_) => {
                    data.insert(
                        "ethereum".to_string(),
                        serde_json::json!({"error": "Failed to fetch Ethereum on-chain data"}),
                    );
                }
            }
        }

        if query.contains("btc") || query.contains("bitcoin") || query.contains("chain") {
            match self.fetch_bitcoin().await {
                Ok(btc) => {
                    data.insert("bitcoin".to_string(), btc);
                }
                Err(_) => {
                    data.insert(
                        "bitcoin".to_string(),
                        serde_json::json!({"error": "Failed to fetch Bitcoin on-chain data"}),
                    );
                }
            }
        }

        if data.is_empty() {
            let general = match self.fetch_quantity("q/getblockcount").await {
                Ok(height) => serde_json::json!({
                    "btc_block_height": height,
                    "note": "Specify \"ethereum\" or \"bitcoin\" for detailed on-chain data",
                }),
                Err(_) => serde_json::json!({
                    "note": "On-chain data temporarily unavailable",
                }),
            };
            data.insert("general".to_string(), general);
        }

        Ok(ToolResult::new(
            serde_json::Value::Object(data),
            "On-Chain Analytics",
            start.elapsed().as_millis() as u64,
        ))
    }
}
