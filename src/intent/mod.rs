// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Intent classification
//!
//! Pure, synchronous inference of what external data a user query
//! requires. No network, no allocation beyond the returned `Intent`;
//! classification must complete in sub-millisecond time so it can run
//! on the hot path of every request.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Data-need category inferred from a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolHint {
    Price,
    Market,
    News,
    Defi,
    Analysis,
    Fear,
    Portfolio,
    Search,
}

impl ToolHint {
    /// All hint categories, in pattern-evaluation order
    pub const ALL: [ToolHint; 8] = [
        ToolHint::Price,
        ToolHint::Market,
        ToolHint::News,
        ToolHint::Defi,
        ToolHint::Analysis,
        ToolHint::Fear,
        ToolHint::Portfolio,
        ToolHint::Search,
    ];
}

/// Query complexity, derived solely from the number of matched hints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// Structured inference of what external data a query requires
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    /// Whether the query references live or time-sensitive data
    pub needs_realtime: bool,

    /// Whether any data-fetch tool should run
    pub needs_tools: bool,

    /// Matched data-need categories
    pub tool_hints: Vec<ToolHint>,

    /// Derived complexity bucket
    pub complexity: Complexity,
}

static PRICE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(price|worth|cost|value|how much)\b.*\b(btc|eth|sol|bitcoin|ethereum|solana|bnb|xrp|ada|doge|avax|dot|matic|link|uni|atom|arb|op|\$[a-z]{2,})\b|\b(btc|eth|sol|bitcoin|ethereum|solana|bnb|xrp|ada|doge|avax|dot|matic|link|uni|atom|arb|op)\b.*\b(price|worth|cost|trading|at)\b",
    )
    .expect("price pattern")
});

static MARKET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(market|cap|volume|dominance|trend|overview|total)\b").expect("market pattern")
});

static NEWS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(news|latest|headline|update|announcement|hack|exploit|breaking)\b")
        .expect("news pattern")
});

static DEFI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(tvl|yield|apy|apr|farm|stake|liquidity|pool|swap|defi|protocol)\b")
        .expect("defi pattern")
});

static ANALYSIS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(analy[sz]\w*|predict|forecast|outlook|bull|bear|support|resistance|technical|ta)\b")
        .expect("analysis pattern")
});

static FEAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(fear|greed|sentiment|index|mood)\b").expect("fear pattern")
});

static PORTFOLIO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(portfolio|holding|bag|position|pnl|profit|loss)\b").expect("portfolio pattern")
});

static SEARCH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(search|find|look up|google|what is|who is|explain)\b").expect("search pattern")
});

static REALTIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(now|today|current|live|latest|right now|at the moment|currently|this week)\b")
        .expect("realtime pattern")
});

fn pattern_for(hint: ToolHint) -> &'static Regex {
    match hint {
        ToolHint::Price => &PRICE_PATTERN,
        ToolHint::Market => &MARKET_PATTERN,
        ToolHint::News => &NEWS_PATTERN,
        ToolHint::Defi => &DEFI_PATTERN,
        ToolHint::Analysis => &ANALYSIS_PATTERN,
        ToolHint::Fear => &FEAR_PATTERN,
        ToolHint::Portfolio => &PORTFOLIO_PATTERN,
        ToolHint::Search => &SEARCH_PATTERN,
    }
}

/// Classify a message into a structured intent.
///
/// Total function: always returns a value, never errors. Generic
/// search phrasing is a fallback-only signal, so `Search` is dropped
/// whenever any more specific category also matched.
pub fn classify(message: &str) -> Intent {
    let mut tool_hints: Vec<ToolHint> = ToolHint::ALL
        .iter()
        .copied()
        .filter(|hint| pattern_for(*hint).is_match(message))
        .collect();

    if tool_hints.len() > 1 {
        tool_hints.retain(|h| *h != ToolHint::Search);
    }

    let needs_realtime = REALTIME_PATTERN.is_match(message) || !tool_hints.is_empty();
    let needs_tools = !tool_hints.is_empty();
    let complexity = match tool_hints.len() {
        0 => Complexity::Low,
        1..=2 => Complexity::Medium,
        _ => Complexity::High,
    };

    Intent {
        needs_realtime,
        needs_tools,
        tool_hints,
        complexity,
    }
}
