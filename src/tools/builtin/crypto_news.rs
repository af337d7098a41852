// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Crypto news headlines from the CryptoCompare news API

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::{NexusError, Result};
use crate::tools::{Tool, ToolParams, ToolResult};

const CRYPTOCOMPARE_API_URL: &str = "https://min-api.cryptocompare.com";

pub struct CryptoNewsTool {
    client: Client,
    base_url: String,
}

impl CryptoNewsTool {
    pub fn new() -> Self {
        Self::with_base_url(CRYPTOCOMPARE_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for CryptoNewsTool {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_body(body: &str) -> String {
    let prefix: String = body.chars().take(200).collect();
    format!("{prefix}...")
}

/// Keep articles whose text mentions a meaningful query word, falling
/// back to the full list when nothing matches
fn filter_relevant(articles: Vec<serde_json::Value>, query: &str) -> Vec<serde_json::Value> {
    let words: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > 3)
        .map(String::from)
        .collect();

    let relevant: Vec<serde_json::Value> = articles
        .iter()
        .filter(|a| {
            let text = format!(
                "{} {} {}",
                a["title"].as_str().unwrap_or(""),
                a["body"].as_str().unwrap_or(""),
                a["categories"].as_str().unwrap_or("")
            )
            .to_lowercase();
            words.iter().any(|w| text.contains(w))
        })
        .cloned()
        .collect();

    if relevant.is_empty() {
        articles
    } else {
        relevant
    }
}

#[async_trait]
impl Tool for CryptoNewsTool {
    fn id(&self) -> &str {
        "crypto_news"
    }

    fn name(&self) -> &str {
        "Crypto News"
    }

    fn description(&self) -> &str {
        "Get the latest crypto news headlines"
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(5000)
    }

    fn cache_ttl(&self) -> u64 {
        120
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult> {
        let start = std::time::Instant::now();

        let url = format!("{}/data/v2/news/?lang=EN&sortOrder=popular", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(NexusError::ToolExecution(format!(
                "CryptoCompare News API error: {}",
                response.status().as_u16()
            )));
        }
        let json: serde_json::Value = response.json().await?;

        let articles: Vec<serde_json::Value> = json["Data"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .take(5)
                    .map(|article| {
                        serde_json::json!({
                            "title": article["title"],
                            "source": article["source"],
                            "url": article["url"],
                            "body": article["body"].as_str().map(truncate_body).unwrap_or_default(),
                            "publishedAt": article["published_on"],
                            "categories": article["categories"],
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let data = serde_json::json!({
            "articles": filter_relevant(articles, &params.query),
        });

        Ok(ToolResult::new(
            data,
            "CryptoCompare",
            start.elapsed().as_millis() as u64,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> serde_json::Value {
        serde_json::json!({
            "title": title,
            "body": "",
            "categories": "",
        })
    }

    #[test]
    fn test_filter_keeps_matching() {
        let articles = vec![article("Bitcoin rallies"), article("Stocks slide")];
        let filtered = filter_relevant(articles, "bitcoin news");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0]["title"], "Bitcoin rallies");
    }

    #[test]
    fn test_filter_falls_back_to_all() {
        let articles = vec![article("Bitcoin rallies"), article("Stocks slide")];
        let filtered = filter_relevant(articles.clone(), "zzz");
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filter_ignores_short_words() {
        // "eth" is only 3 chars, below the relevance threshold
        let articles = vec![article("Ethereum upgrade ships")];
        let filtered = filter_relevant(articles, "eth up");
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(400);
        let out = truncate_body(&long);
        assert_eq!(out.chars().count(), 203);
        assert!(out.ends_with("..."));
    }
}
