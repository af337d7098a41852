// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Configuration management

pub mod settings;

pub use settings::{
    LimitsConfig, MemoryConfig, ProviderConfig, ProvidersConfig, RedisConfig, ServerConfig,
    Settings, VectorConfig,
};
