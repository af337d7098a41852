// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Prompt assembly
//!
//! Builds the system/user prompt pair from a mode template plus
//! context blocks, under a token budget. Blocks are admitted
//! all-or-nothing in strict priority order: tool results first, then
//! recent conversation, then long-term facts (the latter only within
//! half of whatever budget remains). The user message is never
//! truncated or altered.

use chrono::{TimeZone, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::memory::MemoryContext;
use crate::tools::ToolResult;

/// Persona/template selecting the system prompt's analytical framing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Analyst,
    Trader,
    Defi,
    Risk,
}

const ANALYST_PROMPT: &str = "You are Nexus, a crypto & finance intelligence engine in Analyst Mode.

Your role:
- Provide data-driven analysis of crypto markets, tokens, and DeFi protocols
- Cite specific numbers, metrics, and sources when available
- Break down complex market dynamics into clear insights
- Flag risks and uncertainties explicitly
- Never give financial advice — present analysis, not recommendations

Tone: Sharp, data-first, confident when evidence is strong, transparent when uncertain.
Format: Use structured sections, bullet points, and highlight key metrics.

IMPORTANT: If live data is provided below, use it. Never fabricate prices, market caps, or statistics.
If you don't have current data, say so clearly.";

const TRADER_PROMPT: &str = "You are Nexus in Trader Mode.

Your role:
- Focus on actionable technical analysis and market structure
- Discuss support/resistance levels, volume patterns, and momentum indicators
- Analyze risk/reward setups
- Keep responses concise and trading-focused

Tone: Direct, concise, numbers-heavy.
DISCLAIMER: Always end with \"This is not financial advice.\"";

const DEFI_PROMPT: &str = "You are Nexus in DeFi Mode.

Your role:
- Analyze DeFi protocols, yields, TVL trends, and smart contract risks
- Compare protocols objectively with metrics
- Explain complex DeFi mechanics clearly
- Flag rug pull risks, audit status, and protocol maturity

Tone: Technical but accessible, security-conscious.";

const RISK_PROMPT: &str = "You are Nexus in Risk Assessment Mode.

Your role:
- Evaluate investment risks across crypto assets and protocols
- Score risk factors: liquidity, volatility, team, regulatory, smart contract
- Provide balanced bull/bear cases
- Highlight worst-case scenarios

Tone: Conservative, thorough, devil's advocate.";

impl Mode {
    /// Static system template for this mode
    pub fn template(&self) -> &'static str {
        match self {
            Mode::Analyst => ANALYST_PROMPT,
            Mode::Trader => TRADER_PROMPT,
            Mode::Defi => DEFI_PROMPT,
            Mode::Risk => RISK_PROMPT,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Analyst => write!(f, "analyst"),
            Mode::Trader => write!(f, "trader"),
            Mode::Defi => write!(f, "defi"),
            Mode::Risk => write!(f, "risk"),
        }
    }
}

/// Assembled prompt pair
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltPrompt {
    pub system: String,
    pub user: String,
}

/// Cheap length-based token estimate (~4 chars per token).
/// Approximate on purpose; the budget check only needs to be
/// conservative, not exact.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

fn format_tool_results(results: &[ToolResult]) -> String {
    results
        .iter()
        .map(|r| {
            let data = serde_json::to_string_pretty(&r.data).unwrap_or_default();
            let fetched = Utc
                .timestamp_millis_opt(r.timestamp)
                .single()
                .map(|t| t.to_rfc3339())
                .unwrap_or_default();
            format!(
                "[Source: {} | Fetched: {} | Latency: {}ms]\n{}",
                r.source, fetched, r.latency_ms, data
            )
        })
        .collect::<Vec<String>>()
        .join("\n\n")
}

/// Assemble the system/user prompt pair under `max_input_tokens`.
pub fn build(
    user_message: &str,
    mode: Mode,
    memory: &MemoryContext,
    tool_results: &[ToolResult],
    max_input_tokens: usize,
) -> BuiltPrompt {
    let template = mode.template();
    let mut system = template.to_string();
    let mut remaining = max_input_tokens
        .saturating_sub(estimate_tokens(template))
        .saturating_sub(estimate_tokens(user_message));

    // Priority 1: tool data (most time-sensitive)
    if !tool_results.is_empty() {
        let block = format!(
            "\n\n---\n## Live Data (Retrieved Just Now)\n{}",
            format_tool_results(tool_results)
        );
        let tokens = estimate_tokens(&block);
        if tokens < remaining {
            system.push_str(&block);
            remaining -= tokens;
        }
    }

    // Priority 2: recent conversation
    if !memory.short_term.is_empty() {
        let block = format!("\n\n---\n## Recent Conversation\n{}", memory.short_term);
        let tokens = estimate_tokens(&block);
        if tokens < remaining {
            system.push_str(&block);
            remaining -= tokens;
        }
    }

    // Priority 3: long-term facts, admitted only within half the
    // remaining budget
    if !memory.long_term.is_empty() {
        let block = format!("\n\n---\n## User Context\n{}", memory.long_term);
        let tokens = estimate_tokens(&block);
        if tokens * 2 < remaining {
            system.push_str(&block);
        }
    }

    BuiltPrompt {
        system,
        user: user_message.to_string(),
    }
}
