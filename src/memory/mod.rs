// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Conversational memory
//!
//! Two capability interfaces over optional external stores: a bounded,
//! expiring short-term buffer of recent turns, and a long-term store of
//! selectively persisted user facts. Both degrade to empty context when
//! unconfigured or unreachable; memory failures never surface to
//! request handling.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub mod long_term;
pub mod short_term;

pub use long_term::LongTermMemory;
pub use short_term::ShortTermMemory;

/// Maximum stored content length per entry, in characters
pub const MAX_ENTRY_CHARS: usize = 500;

/// Who produced a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One conversation turn in short-term memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub role: Role,

    /// Turn content, capped at [`MAX_ENTRY_CHARS`]
    pub content: String,

    /// Unix millis
    pub timestamp: i64,

    /// Optional condensed form preferred over `content` at recall time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl MemoryEntry {
    /// Create an entry, capping content length
    pub fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.chars().take(MAX_ENTRY_CHARS).collect(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            summary: None,
        }
    }
}

/// Category of a long-term fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    Preference,
    Fact,
    Portfolio,
    Interaction,
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryType::Preference => write!(f, "preference"),
            MemoryType::Fact => write!(f, "fact"),
            MemoryType::Portfolio => write!(f, "portfolio"),
            MemoryType::Interaction => write!(f, "interaction"),
        }
    }
}

/// Recalled context handed to the prompt builder
#[derive(Debug, Clone, Default)]
pub struct MemoryContext {
    /// Serialized recent turns, empty when unavailable
    pub short_term: String,

    /// Formatted persisted facts, empty when unavailable
    pub long_term: String,
}

/// Outcome of the long-term persistence decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersistDecision {
    pub should: bool,
    pub memory_type: MemoryType,
    pub importance: f64,
}

static PORTFOLIO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(i (hold|have|own|bought)|my (portfolio|bag|position|holdings?))\b")
        .expect("portfolio persist pattern")
});

static PREFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(i (prefer|like|want|always|usually|mostly)|remember that|my favorite)\b")
        .expect("preference persist pattern")
});

static SAVE_REQUEST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(remember|save|note|keep in mind)\b").expect("save request pattern")
});

/// Decide whether a user message is worth persisting to long-term
/// memory. Pure rule-based classifier, evaluated only on the user's
/// side of the exchange.
pub fn should_persist(message: &str) -> PersistDecision {
    if PORTFOLIO_PATTERN.is_match(message) {
        return PersistDecision {
            should: true,
            memory_type: MemoryType::Portfolio,
            importance: 0.8,
        };
    }

    if PREFERENCE_PATTERN.is_match(message) {
        return PersistDecision {
            should: true,
            memory_type: MemoryType::Preference,
            importance: 0.7,
        };
    }

    if SAVE_REQUEST_PATTERN.is_match(message) {
        return PersistDecision {
            should: true,
            memory_type: MemoryType::Preference,
            importance: 0.9,
        };
    }

    PersistDecision {
        should: false,
        memory_type: MemoryType::Interaction,
        importance: 0.3,
    }
}
