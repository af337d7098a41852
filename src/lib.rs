// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Nexus - conversational crypto-intelligence engine.
//!
//! This crate exposes the request orchestration pipeline used by:
//! - the `nexus` CLI (`src/main.rs`)
//! - the HTTP/SSE chat server
//!
//! Architecture highlights:
//! - `intent`: pure classification of a query's data needs
//! - `tools`: registry, dispatcher and built-in market-data adapters
//! - `memory`: short-term window and long-term fact store interfaces
//! - `prompt`: token-budgeted prompt assembly per mode
//! - `llm`: provider abstraction, implementations and tier routing
//! - `orchestrator`: the per-request pipeline emitting the event stream
//! - `server`: axum SSE boundary

pub mod cli;
pub mod config;
pub mod error;
pub mod fallback;
pub mod intent;
pub mod llm;
pub mod memory;
pub mod orchestrator;
pub mod prompt;
pub mod server;
pub mod tools;

pub use error::{NexusError, Result};
