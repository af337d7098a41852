// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Demo-mode fallback responder
//!
//! Generates a deterministic, fully-formed response from tool data
//! without an LLM. Used only when no provider is configured; the
//! orchestrator streams the result word by word so downstream
//! consumers see the same event contract either way.

use crate::prompt::Mode;
use crate::tools::ToolResult;

/// Build the demo-mode response for a message and its tool data.
/// Pure function, no I/O; byte-identical output for identical input.
pub fn fallback_response(message: &str, tool_results: &[ToolResult], mode: Mode) -> String {
    let mut parts: Vec<String> = Vec::new();
    parts.push("**[Demo Mode — No LLM key configured]**\n".to_string());
    parts.push("> Add an Anthropic or Groq API key for full AI responses.\n".to_string());

    if tool_results.is_empty() {
        parts.push(format!("I received your message: \"{message}\"\n"));
        parts.push(format!(
            "In full mode (with an API key), I would analyze this using the **{mode}** perspective with AI-powered reasoning.\n"
        ));
        parts.push("**To activate full mode:**".to_string());
        parts.push("1. Get an API key from console.anthropic.com or console.groq.com".to_string());
        parts.push("2. Add it to `~/.nexus/settings.toml` or set `ANTHROPIC_API_KEY`".to_string());
        parts.push("3. Restart the server".to_string());
        return parts.join("\n");
    }

    parts.push("Here's the **live data** I fetched for your query:\n".to_string());

    for result in tool_results {
        parts.push(format!("### {}", result.source));
        parts.push(format!("*Fetched in {}ms*\n", result.latency_ms));

        match result.source.as_str() {
            "CoinGecko" => render_prices(&mut parts, &result.data),
            "Alternative.me Fear & Greed Index" => render_fear_greed(&mut parts, &result.data),
            "CryptoCompare" => render_news(&mut parts, &result.data),
            _ => {
                parts.push("```json".to_string());
                parts.push(serde_json::to_string_pretty(&result.data).unwrap_or_default());
                parts.push("```\n".to_string());
            }
        }
    }

    parts.push(format!(
        "---\n*With an API key, Nexus would provide AI analysis of this data in **{mode} mode**.*"
    ));

    parts.join("\n")
}

fn capitalize(coin: &str) -> String {
    let mut chars = coin.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn render_prices(parts: &mut Vec<String>, data: &serde_json::Value) {
    let Some(prices) = data.as_object() else {
        return;
    };

    // Sort for deterministic output regardless of fetch order
    let mut coins: Vec<(&String, &serde_json::Value)> = prices.iter().collect();
    coins.sort_by_key(|(coin, _)| coin.as_str());

    for (coin, info) in coins {
        let Some(usd) = info["usd"].as_f64() else {
            continue;
        };
        let change = info["usd_24h_change"]
            .as_f64()
            .map(|c| format!(" ({}{:.2}% 24h)", if c >= 0.0 { "+" } else { "" }, c))
            .unwrap_or_default();
        let mcap = info["usd_market_cap"]
            .as_f64()
            .map(|m| format!(" | MCap: ${:.1}B", m / 1e9))
            .unwrap_or_default();
        parts.push(format!("- **{}**: ${usd}{change}{mcap}", capitalize(coin)));
    }
    parts.push(String::new());
}

fn render_fear_greed(parts: &mut Vec<String>, data: &serde_json::Value) {
    parts.push(format!("- **Score**: {}/100", data["value"]));
    parts.push(format!(
        "- **Label**: {}",
        data["label"].as_str().unwrap_or("Unknown")
    ));
    parts.push(format!(
        "- **Analysis**: {}",
        data["description"].as_str().unwrap_or("")
    ));
    parts.push(String::new());
}

fn render_news(parts: &mut Vec<String>, data: &serde_json::Value) {
    let Some(articles) = data["articles"].as_array() else {
        return;
    };
    for article in articles.iter().take(5) {
        parts.push(format!(
            "- **{}** *({})*",
            article["title"].as_str().unwrap_or("Untitled"),
            article["source"].as_str().unwrap_or("unknown")
        ));
    }
    parts.push(String::new());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolResult;

    fn result(source: &str, data: serde_json::Value) -> ToolResult {
        ToolResult {
            data,
            source: source.to_string(),
            timestamp: 1_700_000_000_000,
            latency_ms: 50,
            cached: false,
        }
    }

    #[test]
    fn test_no_tool_data_explains_setup() {
        let response = fallback_response("hello", &[], Mode::Analyst);
        assert!(response.contains("Demo Mode"));
        assert!(response.contains("I received your message: \"hello\""));
        assert!(response.contains("To activate full mode"));
        assert!(response.contains("analyst"));
    }

    #[test]
    fn test_price_data_rendered() {
        let data = serde_json::json!({
            "bitcoin": {"usd": 50000.0, "usd_24h_change": 2.5, "usd_market_cap": 1.0e12}
        });
        let response = fallback_response("btc?", &[result("CoinGecko", data)], Mode::Analyst);
        assert!(response.contains("### CoinGecko"));
        assert!(response.contains("**Bitcoin**: $50000"));
        assert!(response.contains("(+2.50% 24h)"));
        assert!(response.contains("MCap: $1000.0B"));
    }

    #[test]
    fn test_fear_greed_rendered() {
        let data = serde_json::json!({
            "value": 72,
            "label": "Greed",
            "description": "Greed — investors are getting greedy, caution advised"
        });
        let response = fallback_response(
            "sentiment?",
            &[result("Alternative.me Fear & Greed Index", data)],
            Mode::Analyst,
        );
        assert!(response.contains("**Score**: 72/100"));
        assert!(response.contains("**Label**: Greed"));
    }

    #[test]
    fn test_news_rendered() {
        let data = serde_json::json!({
            "articles": [{"title": "Bitcoin rallies", "source": "Wire"}]
        });
        let response = fallback_response("news?", &[result("CryptoCompare", data)], Mode::Analyst);
        assert!(response.contains("- **Bitcoin rallies** *(Wire)*"));
    }

    #[test]
    fn test_unknown_source_json_dump() {
        let data = serde_json::json!({"anything": 1});
        let response = fallback_response("q", &[result("Custom", data)], Mode::Analyst);
        assert!(response.contains("```json"));
        assert!(response.contains("\"anything\": 1"));
    }

    #[test]
    fn test_deterministic_given_same_data() {
        let data = serde_json::json!({"bitcoin": {"usd": 50000.0}});
        let a = fallback_response("q", &[result("CoinGecko", data.clone())], Mode::Trader);
        let b = fallback_response("q", &[result("CoinGecko", data)], Mode::Trader);
        assert_eq!(a, b);
    }

    #[test]
    fn test_mode_named_in_footer() {
        let response = fallback_response("q", &[], Mode::Risk);
        assert!(response.contains("risk"));
    }
}
