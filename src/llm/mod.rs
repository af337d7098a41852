// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! LLM module for Nexus
//!
//! Provides abstraction over streaming LLM providers and tier-based
//! routing between them.

pub mod mock_provider;
pub mod provider;
pub mod providers;
pub mod router;

pub use mock_provider::MockProvider;
pub use provider::*;
pub use router::LlmRouter;
