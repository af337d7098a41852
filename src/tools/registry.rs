// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Tool registry and dispatcher
//!
//! The registry is the capability table shared across all concurrent
//! requests. It holds an atomically-swappable immutable snapshot of the
//! tool map, so a dispatch in flight never observes a half-applied
//! plugin registration. Built-in tools are registered once at startup;
//! plugins may be added and removed at runtime.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};
use tracing::{info, warn};

use crate::error::{NexusError, Result};
use crate::intent::ToolHint;
use crate::tools::builtin;
use crate::tools::plugin::{PluginManifest, PluginTool};
use crate::tools::{Tool, ToolParams, ToolResult};

/// Hint-to-tool-id mapping. Many-to-many: a hint may resolve to several
/// tools, and several hints may resolve to the same tool.
fn tools_for_hint(hint: ToolHint) -> &'static [&'static str] {
    match hint {
        ToolHint::Price => &["market_price"],
        ToolHint::Market => &["market_price"],
        ToolHint::News => &["crypto_news"],
        ToolHint::Fear => &["fear_greed"],
        ToolHint::Analysis => &["market_price", "fear_greed"],
        ToolHint::Defi => &["defi_tvl"],
        ToolHint::Portfolio => &["market_price"],
        ToolHint::Search => &["live_search"],
    }
}

static GAS_TRIGGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(gas|gwei|fee|transaction cost)\b").expect("gas trigger"));

static WHALE_TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(whale|large transaction|big transfer)\b").expect("whale trigger")
});

static ONCHAIN_TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(on.?chain|hashrate|difficulty|block height|supply)\b").expect("onchain trigger")
});

/// Keyword-triggered tool ids, checked against the raw query independent
/// of the hint system. Additive only: a trigger can pull a tool in but
/// never removes one that hints already resolved.
fn keyword_triggers() -> [(&'static Regex, &'static str); 3] {
    [
        (&GAS_TRIGGER, "gas_tracker"),
        (&WHALE_TRIGGER, "whale_tracker"),
        (&ONCHAIN_TRIGGER, "onchain_data"),
    ]
}

type ToolMap = HashMap<String, Arc<dyn Tool>>;

/// Registry of available data-fetch tools
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Arc<RwLock<Arc<ToolMap>>>,
    plugins: Arc<RwLock<Vec<PluginManifest>>>,
}

impl ToolRegistry {
    /// Create a registry with all built-in tools registered
    pub fn new() -> Self {
        let registry = Self::empty();
        for tool in builtin::all() {
            registry.register(tool);
        }
        registry
    }

    /// Create a registry with no tools (used by tests and as the base
    /// for `new`)
    pub fn empty() -> Self {
        Self {
            tools: Arc::new(RwLock::new(Arc::new(HashMap::new()))),
            plugins: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Take a consistent snapshot of the tool map
    fn snapshot(&self) -> Arc<ToolMap> {
        match self.tools.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Register a tool via copy-on-write swap. Last write wins on id
    /// collision.
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let mut guard = match self.tools.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut next = (**guard).clone();
        next.insert(tool.id().to_string(), tool);
        *guard = Arc::new(next);
    }

    /// Remove a tool by id via copy-on-write swap
    fn remove(&self, id: &str) -> bool {
        let mut guard = match self.tools.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut next = (**guard).clone();
        let removed = next.remove(id).is_some();
        *guard = Arc::new(next);
        removed
    }

    /// Resolve hints to tools, deduplicated, in hint order
    pub fn resolve(&self, hints: &[ToolHint]) -> Vec<Arc<dyn Tool>> {
        let snapshot = self.snapshot();
        let mut seen = Vec::new();
        let mut resolved = Vec::new();

        for hint in hints {
            for &id in tools_for_hint(*hint) {
                if seen.contains(&id) {
                    continue;
                }
                seen.push(id);
                if let Some(tool) = snapshot.get(id) {
                    resolved.push(Arc::clone(tool));
                }
            }
        }

        resolved
    }

    /// Apply secondary keyword triggers to an already-resolved set.
    /// Additive recall net: matching keywords pull in tools the hint
    /// system missed, plus any plugin whose manifest keywords match.
    fn apply_keyword_triggers(&self, query: &str, resolved: &mut Vec<Arc<dyn Tool>>) {
        let snapshot = self.snapshot();

        for (pattern, id) in keyword_triggers() {
            if pattern.is_match(query) && !resolved.iter().any(|t| t.id() == id) {
                if let Some(tool) = snapshot.get(id) {
                    resolved.push(Arc::clone(tool));
                }
            }
        }

        let manifests = match self.plugins.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let lower = query.to_lowercase();
        for manifest in manifests {
            let tool_id = manifest.tool_id();
            if resolved.iter().any(|t| t.id() == tool_id) {
                continue;
            }
            if manifest.keywords.iter().any(|k| lower.contains(&k.to_lowercase())) {
                if let Some(tool) = snapshot.get(&tool_id) {
                    resolved.push(Arc::clone(tool));
                }
            }
        }
    }

    /// Execute all tools relevant to the query concurrently.
    ///
    /// Each invocation races against its own timeout. A failing or
    /// timed-out tool is logged and dropped; only successful results are
    /// returned. An empty resolution returns immediately with no network
    /// calls.
    pub async fn dispatch(&self, hints: &[ToolHint], query: &str) -> Vec<ToolResult> {
        let mut tools = self.resolve(hints);
        self.apply_keyword_triggers(query, &mut tools);

        if tools.is_empty() {
            return Vec::new();
        }

        let start = std::time::Instant::now();
        let params = ToolParams::new(query);

        let invocations = tools.iter().map(|tool| {
            let tool = Arc::clone(tool);
            let params = params.clone();
            async move {
                match tokio::time::timeout(tool.timeout(), tool.execute(&params)).await {
                    Ok(Ok(result)) => Some(result),
                    Ok(Err(err)) => {
                        warn!(tool = tool.id(), error = %err, "tool failed");
                        None
                    }
                    Err(_) => {
                        warn!(tool = tool.id(), timeout_ms = tool.timeout().as_millis() as u64, "tool timed out");
                        None
                    }
                }
            }
        });

        let successful: Vec<ToolResult> = futures::future::join_all(invocations)
            .await
            .into_iter()
            .flatten()
            .collect();

        info!(
            requested = tools.len(),
            succeeded = successful.len(),
            total_latency_ms = start.elapsed().as_millis() as u64,
            "tools dispatched"
        );

        successful
    }

    /// Register a plugin tool from its manifest. Replaces any existing
    /// tool with the same id.
    pub fn register_plugin(&self, manifest: PluginManifest) -> Result<String> {
        manifest.validate()?;

        let tool = PluginTool::new(manifest.clone());
        let tool_id = tool.id().to_string();
        self.register(Arc::new(tool));

        let mut manifests = match self.plugins.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        manifests.retain(|m| m.id != manifest.id);
        info!(plugin = %manifest.id, version = %manifest.version, "plugin registered");
        manifests.push(manifest);

        Ok(tool_id)
    }

    /// Unregister a plugin by manifest id. Returns whether it existed.
    pub fn unregister_plugin(&self, id: &str) -> Result<bool> {
        let mut manifests = match self.plugins.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = manifests.len();
        manifests.retain(|m| m.id != id);
        if manifests.len() == before {
            return Ok(false);
        }
        drop(manifests);

        let removed = self.remove(&PluginManifest::tool_id_for(id));
        if !removed {
            return Err(NexusError::Plugin(format!(
                "manifest for '{id}' existed but its tool was missing"
            )));
        }
        info!(plugin = id, "plugin unregistered");
        Ok(true)
    }

    /// List all registered tools as (id, name, description)
    pub fn available_tools(&self) -> Vec<(String, String, String)> {
        let snapshot = self.snapshot();
        let mut listing: Vec<(String, String, String)> = snapshot
            .values()
            .map(|t| {
                (
                    t.id().to_string(),
                    t.name().to_string(),
                    t.description().to_string(),
                )
            })
            .collect();
        listing.sort_by(|a, b| a.0.cmp(&b.0));
        listing
    }

    /// List registered plugin manifests
    pub fn registered_plugins(&self) -> Vec<PluginManifest> {
        match self.plugins.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether the registry has no tools
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
