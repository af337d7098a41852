// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! HTTP server boundary
//!
//! Exposes the orchestration pipeline over an SSE chat endpoint plus
//! tool, plugin and health routes under `/api/v1/`.

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::{NexusError, Result};
use crate::orchestrator::Orchestrator;

pub mod api;

/// Shared state for all routes
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
}

/// Build the application router
pub fn app(orchestrator: Orchestrator) -> Router {
    let state = AppState { orchestrator };

    Router::new()
        .route("/api/v1/chat", post(api::chat))
        .route("/api/v1/tools", get(api::list_tools))
        .route("/api/v1/plugins", get(api::list_plugins))
        .route("/api/v1/plugins", post(api::register_plugin))
        .route("/api/v1/plugins/{id}", delete(api::unregister_plugin))
        .route("/api/v1/health", get(api::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until the process is stopped
pub async fn serve(orchestrator: Orchestrator, bind: &str) -> Result<()> {
    let router = app(orchestrator);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(bind, "nexus server listening");
    axum::serve(listener, router)
        .await
        .map_err(|e| NexusError::Config(format!("server error: {e}")))?;
    Ok(())
}
