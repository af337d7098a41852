// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

use nexus::memory::MemoryContext;
use nexus::prompt::{build, estimate_tokens, Mode};
use nexus::tools::ToolResult;

fn result_with_payload(chars: usize) -> ToolResult {
    ToolResult {
        data: serde_json::json!({"blob": "x".repeat(chars)}),
        source: "CoinGecko".to_string(),
        timestamp: 1_700_000_000_000,
        latency_ms: 10,
        cached: false,
    }
}

#[test]
fn test_oversized_tool_block_fully_omitted_but_memory_kept() {
    let results = vec![result_with_payload(50_000)];
    let memory = MemoryContext {
        short_term: "[user]: earlier question\n[assistant]: earlier answer".to_string(),
        long_term: String::new(),
    };

    let prompt = build("what now?", Mode::Analyst, &memory, &results, 1500);

    assert!(!prompt.system.contains("Live Data"));
    assert!(!prompt.system.contains("blob"));
    assert!(prompt.system.contains("## Recent Conversation"));
    assert!(prompt.system.contains("earlier answer"));
}

#[test]
fn test_everything_fits_in_generous_budget() {
    let results = vec![result_with_payload(100)];
    let memory = MemoryContext {
        short_term: "[user]: hi".to_string(),
        long_term: "- [fact] prefers eth".to_string(),
    };

    let prompt = build("question", Mode::Analyst, &memory, &results, 10_000);

    assert!(prompt.system.contains("## Live Data (Retrieved Just Now)"));
    assert!(prompt.system.contains("## Recent Conversation"));
    assert!(prompt.system.contains("## User Context"));
}

#[test]
fn test_budget_never_exceeded() {
    let budget = 2000;
    let results = vec![result_with_payload(1000)];
    let memory = MemoryContext {
        short_term: "m".repeat(2000),
        long_term: "l".repeat(2000),
    };

    let prompt = build("u".repeat(100).as_str(), Mode::Analyst, &memory, &results, budget);

    assert!(estimate_tokens(&prompt.system) + estimate_tokens(&prompt.user) <= budget);
}

#[test]
fn test_system_template_always_present() {
    // Even with a budget too small for any context, the template and
    // untouched user message come through
    let results = vec![result_with_payload(10_000)];
    let memory = MemoryContext {
        short_term: "s".repeat(10_000),
        long_term: "l".repeat(10_000),
    };

    let prompt = build("my question", Mode::Defi, &memory, &results, 100);

    assert!(prompt.system.starts_with("You are Nexus in DeFi Mode."));
    assert_eq!(prompt.user, "my question");
    assert!(!prompt.system.contains("## Live Data"));
    assert!(!prompt.system.contains("## Recent Conversation"));
    assert!(!prompt.system.contains("## User Context"));
}

#[test]
fn test_all_modes_have_distinct_templates() {
    let templates: Vec<&str> = [Mode::Analyst, Mode::Trader, Mode::Defi, Mode::Risk]
        .iter()
        .map(|m| m.template())
        .collect();

    for (i, a) in templates.iter().enumerate() {
        for b in templates.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_mode_serde_lowercase() {
    assert_eq!(serde_json::to_string(&Mode::Defi).unwrap(), "\"defi\"");
    let mode: Mode = serde_json::from_str("\"trader\"").unwrap();
    assert_eq!(mode, Mode::Trader);
}
