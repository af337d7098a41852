// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Settings management for Nexus
//!
//! Handles loading and saving settings from ~/.nexus/settings.toml.
//! Secrets are env-first: the settings file names an environment
//! variable per credential and storing keys directly in the file is
//! supported but not recommended.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{NexusError, Result};

/// Main settings structure, stored in ~/.nexus/settings.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// LLM provider configurations
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Memory store endpoints
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Token limits per request
    #[serde(default)]
    pub limits: LimitsConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Configuration for LLM providers
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    /// Anthropic Claude configuration (pro tier)
    #[serde(default)]
    pub anthropic: ProviderConfig,

    /// Groq configuration (baseline)
    #[serde(default)]
    pub groq: ProviderConfig,
}

/// One provider's configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (if stored directly, not recommended)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for the API key
    #[serde(default)]
    pub api_key_env: String,

    /// Model id to use
    #[serde(default)]
    pub model: String,

    /// Base URL override (for custom endpoints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: String::new(),
            model: String::new(),
            base_url: None,
        }
    }
}

impl ProviderConfig {
    /// Resolve the API key: explicit value first, then the named
    /// environment variable. None means the provider is unconfigured.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        if self.api_key_env.is_empty() {
            return None;
        }
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }
}

/// Memory store endpoints, both optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MemoryConfig {
    /// Redis REST endpoint for short-term memory
    #[serde(default)]
    pub redis: RedisConfig,

    /// Vector REST endpoint for long-term memory
    #[serde(default)]
    pub vector: VectorConfig,
}

/// Short-term store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// REST base URL (or env var fallback)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// REST token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable for the URL
    #[serde(default = "default_redis_url_env")]
    pub url_env: String,

    /// Environment variable for the token
    #[serde(default = "default_redis_token_env")]
    pub token_env: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            url_env: default_redis_url_env(),
            token_env: default_redis_token_env(),
        }
    }
}

impl RedisConfig {
    pub fn resolve_url(&self) -> Option<String> {
        resolve(&self.url, &self.url_env)
    }

    pub fn resolve_token(&self) -> Option<String> {
        resolve(&self.token, &self.token_env)
    }
}

/// Long-term store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Store base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Service key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_key: Option<String>,

    /// Environment variable for the URL
    #[serde(default = "default_vector_url_env")]
    pub url_env: String,

    /// Environment variable for the service key
    #[serde(default = "default_vector_key_env")]
    pub service_key_env: String,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            url: None,
            service_key: None,
            url_env: default_vector_url_env(),
            service_key_env: default_vector_key_env(),
        }
    }
}

impl VectorConfig {
    pub fn resolve_url(&self) -> Option<String> {
        resolve(&self.url, &self.url_env)
    }

    pub fn resolve_service_key(&self) -> Option<String> {
        resolve(&self.service_key, &self.service_key_env)
    }
}

fn resolve(explicit: &Option<String>, env_name: &str) -> Option<String> {
    if let Some(value) = explicit {
        if !value.is_empty() {
            return Some(value.clone());
        }
    }
    if env_name.is_empty() {
        return None;
    }
    std::env::var(env_name).ok().filter(|v| !v.is_empty())
}

/// Token limits per request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Input context budget for prompt assembly
    #[serde(default = "default_max_input_tokens")]
    pub max_input_tokens: usize,

    /// Output budget for the free tier
    #[serde(default = "default_free_max_output_tokens")]
    pub free_max_output_tokens: u32,

    /// Output budget for the pro tier
    #[serde(default = "default_pro_max_output_tokens")]
    pub pro_max_output_tokens: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_tokens: default_max_input_tokens(),
            free_max_output_tokens: default_free_max_output_tokens(),
            pro_max_output_tokens: default_pro_max_output_tokens(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_redis_url_env() -> String {
    "UPSTASH_REDIS_REST_URL".to_string()
}

fn default_redis_token_env() -> String {
    "UPSTASH_REDIS_REST_TOKEN".to_string()
}

fn default_vector_url_env() -> String {
    "SUPABASE_URL".to_string()
}

fn default_vector_key_env() -> String {
    "SUPABASE_SERVICE_ROLE_KEY".to_string()
}

fn default_max_input_tokens() -> usize {
    3000
}

fn default_free_max_output_tokens() -> u32 {
    1024
}

fn default_pro_max_output_tokens() -> u32 {
    1500
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";
const ANTHROPIC_DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

impl Settings {
    /// Settings file path: ~/.nexus/settings.toml
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| NexusError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".nexus").join("settings.toml"))
    }

    /// Load settings from the default path, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load settings from an explicit path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default().with_env_defaults());
        }
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings.with_env_defaults())
    }

    /// Fill in the conventional env var names and default models for
    /// fields the file left empty.
    fn with_env_defaults(mut self) -> Self {
        if self.providers.anthropic.api_key_env.is_empty() {
            self.providers.anthropic.api_key_env = ANTHROPIC_API_KEY_ENV.to_string();
        }
        if self.providers.anthropic.model.is_empty() {
            self.providers.anthropic.model = ANTHROPIC_DEFAULT_MODEL.to_string();
        }
        if self.providers.groq.api_key_env.is_empty() {
            self.providers.groq.api_key_env = GROQ_API_KEY_ENV.to_string();
        }
        if self.providers.groq.model.is_empty() {
            self.providers.groq.model = GROQ_DEFAULT_MODEL.to_string();
        }
        self
    }

    /// Save settings to an explicit path, creating parent directories
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
