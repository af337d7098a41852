// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Large-transfer tracking
//!
//! With a Whale Alert API key, queries the Whale Alert transaction
//! feed. Without one, falls back to Blockchain.com's public mempool and
//! surfaces unconfirmed BTC transactions above 10 BTC.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use std::time::Duration;

use crate::error::{NexusError, Result};
use crate::tools::{Tool, ToolParams, ToolResult};

const BLOCKCHAIN_INFO_URL: &str = "https://blockchain.info";
const WHALE_ALERT_API_URL: &str = "https://api.whale-alert.io";
const WHALE_ALERT_API_KEY_ENV: &str = "WHALE_ALERT_API_KEY";

const SATS_PER_BTC: f64 = 1e8;
const LARGE_TX_THRESHOLD_SATS: f64 = 10.0 * SATS_PER_BTC;

pub struct WhaleTrackerTool {
    client: Client,
    btc_base_url: String,
    whale_base_url: String,
    api_key: Option<String>,
}

impl WhaleTrackerTool {
    pub fn new() -> Self {
        Self::with_base_urls(BLOCKCHAIN_INFO_URL, WHALE_ALERT_API_URL)
    }

    pub fn with_base_urls(
        btc_base_url: impl Into<String>,
        whale_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            btc_base_url: btc_base_url.into(),
            whale_base_url: whale_base_url.into(),
            api_key: std::env::var(WHALE_ALERT_API_KEY_ENV).ok(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    async fn fetch_public_mempool(&self) -> Result<serde_json::Value> {
        let url = format!("{}/unconfirmed-transactions?format=json", self.btc_base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(NexusError::ToolExecution(format!(
                "Blockchain API error: {}",
                response.status().as_u16()
            )));
        }
        let json: serde_json::Value = response.json().await?;

        let large_txs: Vec<serde_json::Value> = json["txs"]
            .as_array()
            .map(|txs| {
                txs.iter()
                    .filter(|tx| total_output_sats(tx) > LARGE_TX_THRESHOLD_SATS)
                    .take(5)
                    .map(|tx| {
                        let total_btc = total_output_sats(tx) / SATS_PER_BTC;
                        let time = tx["time"]
                            .as_i64()
                            .and_then(|t| Utc.timestamp_opt(t, 0).single())
                            .map(|t| t.to_rfc3339())
                            .unwrap_or_default();
                        serde_json::json!({
                            "hash": short_hash(&tx["hash"]),
                            "amount_btc": format!("{total_btc:.4}"),
                            "inputs": tx["inputs"].as_array().map(Vec::len).unwrap_or(0),
                            "outputs": tx["out"].as_array().map(Vec::len).unwrap_or(0),
                            "time": time,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(serde_json::json!({
            "network": "Bitcoin",
            "large_transactions": large_txs,
            "note": "Showing unconfirmed transactions >10 BTC",
        }))
    }

    async fn fetch_whale_alert(&self, api_key: &str) -> Result<serde_json::Value> {
        let since = Utc::now().timestamp() - 3600;
        let url = format!(
            "{}/v1/transactions?api_key={api_key}&min_value=500000&start={since}",
            self.whale_base_url
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(NexusError::ToolExecution(format!(
                "Whale Alert API error: {}",
                response.status().as_u16()
            )));
        }
        let json: serde_json::Value = response.json().await?;

        let transactions: Vec<serde_json::Value> = json["transactions"]
            .as_array()
            .map(|txs| {
                txs.iter()
                    .take(10)
                    .map(|tx| {
                        let timestamp = tx["timestamp"]
                            .as_i64()
                            .and_then(|t| Utc.timestamp_opt(t, 0).single())
                            .map(|t| t.to_rfc3339())
                            .unwrap_or_default();
                        serde_json::json!({
                            "blockchain": tx["blockchain"],
                            "symbol": tx["symbol"],
                            "amount": tx["amount"],
                            "amount_usd": tx["amount_usd"],
                            "from": tx["from"]["owner_type"].as_str().unwrap_or("unknown"),
                            "to": tx["to"]["owner_type"].as_str().unwrap_or("unknown"),
                            "hash": short_hash(&tx["hash"]),
                            "timestamp": timestamp,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(serde_json::json!({
            "transactions": transactions,
            "count": json["count"],
        }))
    }
}

fn total_output_sats(tx: &serde_json::Value) -> f64 {
    tx["out"]
        .as_array()
        .map(|outs| {
            outs.iter()
                .filter_map(|o| o["value"].as_f64())
                .sum()
        })
        .unwrap_or(0.0)
}

fn short_hash(hash: &serde_json::Value) -> String {
    let h = hash.as_str().unwrap_or("");
    let prefix: String = h.chars().take(16).collect();
    format!("{prefix}...")
}

impl Default for WhaleTrackerTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WhaleTrackerTool {
    fn id(&self) -> &str {
        "whale_tracker"
    }

    fn name(&self) -> &str {
        "Whale Tracker"
    }

    fn description(&self) -> &str {
        "Track large crypto transactions and whale movements"
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(5000)
    }

    fn cache_ttl(&self) -> u64 {
        60
    }

    async fn execute(&self, _params: &ToolParams) -> Result<ToolResult> {
        let start = std::time::Instant::now();

        let (data, source) = match &self.api_key {
            Some(key) => (self.fetch_whale_alert(key).await?, "Whale Alert"),
            None => (
                self.fetch_public_mempool().await?,
                "Blockchain.com Whale Tracker",
            ),
        };

        Ok(ToolResult::new(
            data,
            source,
            start.elapsed().as_millis() as u64,
        ))
    }
}
