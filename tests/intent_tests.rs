// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

use nexus::intent::{classify, Complexity, ToolHint};
use proptest::prelude::*;

#[test]
fn test_price_trigger_with_mapped_symbol_sets_price_hint() {
    for message in [
        "What's the price of bitcoin right now?",
        "how much is eth worth",
        "solana cost today",
        "what is the value of $doge",
    ] {
        let intent = classify(message);
        assert!(
            intent.tool_hints.contains(&ToolHint::Price),
            "expected price hint for: {message}"
        );
        assert!(intent.needs_tools, "expected needs_tools for: {message}");
    }
}

#[test]
fn test_two_specific_hints_plus_search_phrase_excludes_search() {
    let intent = classify("look up the latest news and fear index for bitcoin");
    assert!(intent.tool_hints.len() >= 2);
    assert!(!intent.tool_hints.contains(&ToolHint::Search));
}

#[test]
fn test_realtime_marker_alone() {
    let intent = classify("what should I cook today");
    assert!(intent.needs_realtime);
    assert!(!intent.needs_tools);
}

#[test]
fn test_complexity_matches_hint_count() {
    let low = classify("hi");
    assert_eq!(low.complexity, Complexity::Low);
    assert!(low.tool_hints.is_empty());

    let medium = classify("bitcoin price please");
    assert_eq!(medium.complexity, Complexity::Medium);
    assert!(!medium.tool_hints.is_empty() && medium.tool_hints.len() <= 2);

    let high = classify("analyze the market trend, defi yields and latest news for eth");
    assert_eq!(high.complexity, Complexity::High);
    assert!(high.tool_hints.len() > 2);
}

#[test]
fn test_defi_vocabulary() {
    let intent = classify("best apy liquidity pools?");
    assert!(intent.tool_hints.contains(&ToolHint::Defi));
}

proptest! {
    // The classifier is a total function: any input yields a
    // consistent Intent without panicking.
    #[test]
    fn classify_never_panics(message in "\\PC*") {
        let intent = classify(&message);
        prop_assert_eq!(intent.needs_tools, !intent.tool_hints.is_empty());
        let expected = match intent.tool_hints.len() {
            0 => Complexity::Low,
            1..=2 => Complexity::Medium,
            _ => Complexity::High,
        };
        prop_assert_eq!(intent.complexity, expected);
        if intent.needs_tools {
            prop_assert!(intent.needs_realtime);
        }
    }

    #[test]
    fn search_never_survives_alongside_other_hints(message in "\\PC*") {
        let intent = classify(&message);
        if intent.tool_hints.len() > 1 {
            prop_assert!(!intent.tool_hints.contains(&ToolHint::Search));
        }
    }
}
