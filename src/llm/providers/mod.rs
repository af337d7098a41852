// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! LLM provider implementations

pub mod anthropic;
pub mod groq;

pub use anthropic::AnthropicProvider;
pub use groq::GroqProvider;
