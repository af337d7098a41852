// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Market price tool backed by the CoinGecko simple-price API

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::{NexusError, Result};
use crate::tools::{Tool, ToolParams, ToolResult};

const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Known ticker/name to CoinGecko id mapping
const SYMBOL_MAP: [(&str, &str); 19] = [
    ("btc", "bitcoin"),
    ("bitcoin", "bitcoin"),
    ("eth", "ethereum"),
    ("ethereum", "ethereum"),
    ("sol", "solana"),
    ("solana", "solana"),
    ("bnb", "binancecoin"),
    ("xrp", "ripple"),
    ("ada", "cardano"),
    ("doge", "dogecoin"),
    ("avax", "avalanche-2"),
    ("dot", "polkadot"),
    ("matic", "matic-network"),
    ("polygon", "matic-network"),
    ("link", "chainlink"),
    ("uni", "uniswap"),
    ("atom", "cosmos"),
    ("arb", "arbitrum"),
    ("op", "optimism"),
];

fn lookup(symbol: &str) -> Option<&'static str> {
    SYMBOL_MAP
        .iter()
        .find(|(key, _)| *key == symbol)
        .map(|(_, id)| *id)
}

/// Extract CoinGecko ids mentioned in a query, defaulting to bitcoin
fn extract_symbols(query: &str) -> Vec<&'static str> {
    let lower = query.to_lowercase();
    let mut found: Vec<&'static str> = Vec::new();

    // $TOKEN mentions take precedence
    for chunk in lower.split_whitespace() {
        if let Some(ticker) = chunk.strip_prefix('$') {
            let ticker = ticker.trim_matches(|c: char| !c.is_alphanumeric());
            if let Some(id) = lookup(ticker) {
                if !found.contains(&id) {
                    found.push(id);
                }
            }
        }
    }

    for (key, id) in SYMBOL_MAP {
        if lower.contains(key) && !found.contains(&id) {
            found.push(id);
        }
    }

    if found.is_empty() {
        found.push("bitcoin");
    }
    found
}

/// Real-time price, 24h change, market cap and volume
pub struct MarketPriceTool {
    client: Client,
    base_url: String,
}

impl MarketPriceTool {
    pub fn new() -> Self {
        Self::with_base_url(COINGECKO_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for MarketPriceTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for MarketPriceTool {
    fn id(&self) -> &str {
        "market_price"
    }

    fn name(&self) -> &str {
        "Market Price"
    }

    fn description(&self) -> &str {
        "Get real-time crypto prices, 24h change, market cap, and volume"
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(5000)
    }

    fn cache_ttl(&self) -> u64 {
        30
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult> {
        let start = std::time::Instant::now();

        let ids: Vec<String> = match &params.symbol {
            Some(symbol) => {
                let lower = symbol.to_lowercase();
                vec![lookup(&lower).map(String::from).unwrap_or(lower)]
            }
            None => extract_symbols(&params.query)
                .into_iter()
                .map(String::from)
                .collect(),
        };

        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_24hr_change=true&include_market_cap=true&include_24hr_vol=true",
            self.base_url,
            ids.join(",")
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(NexusError::ToolExecution(format!(
                "CoinGecko API error: {}",
                response.status().as_u16()
            )));
        }
        let data: serde_json::Value = response.json().await?;

        Ok(ToolResult::new(
            data,
            "CoinGecko",
            start.elapsed().as_millis() as u64,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_known_ticker() {
        assert_eq!(extract_symbols("what is the btc price"), vec!["bitcoin"]);
    }

    #[test]
    fn test_extract_full_name() {
        assert_eq!(extract_symbols("ethereum outlook"), vec!["ethereum"]);
    }

    #[test]
    fn test_extract_dollar_ticker() {
        let ids = extract_symbols("thoughts on $sol right now?");
        assert_eq!(ids, vec!["solana"]);
    }

    #[test]
    fn test_extract_multiple() {
        let ids = extract_symbols("compare btc and eth");
        assert!(ids.contains(&"bitcoin"));
        assert!(ids.contains(&"ethereum"));
    }

    #[test]
    fn test_extract_defaults_to_bitcoin() {
        assert_eq!(extract_symbols("price please"), vec!["bitcoin"]);
    }

    #[test]
    fn test_extract_no_duplicates() {
        assert_eq!(extract_symbols("$btc btc bitcoin"), vec!["bitcoin"]);
    }
}
