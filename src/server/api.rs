// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! API route handlers
//!
//! The chat handler validates input synchronously, then streams
//! JSON-encoded [`ChatEvent`]s as SSE `data:` blocks. The connection
//! closes after the terminal event; client disconnect drops the
//! stream, which cancels the in-flight orchestration.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;

use crate::llm::router::Tier;
use crate::orchestrator::{validate_message, ChatRequest};
use crate::prompt::Mode;
use crate::server::AppState;
use crate::tools::PluginManifest;

const SESSION_HEADER: &str = "x-session-id";
const ANONYMOUS_USER: &str = "anonymous";

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
    #[serde(default)]
    pub mode: Option<Mode>,
    #[serde(default)]
    pub tier: Option<Tier>,
}

fn user_id_from(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(ANONYMOUS_USER)
        .to_string()
}

/// POST /api/v1/chat
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ChatBody>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, Json<serde_json::Value>)>
{
    let message = match validate_message(&body.message) {
        Ok(message) => message.to_string(),
        Err(reason) => {
            return Err((StatusCode::BAD_REQUEST, Json(json!({"error": reason}))));
        }
    };

    let request = ChatRequest::new(message, user_id_from(&headers))
        .with_mode(body.mode.unwrap_or_default())
        .with_tier(body.tier.unwrap_or_default());

    let events = state.orchestrator.run(request).map(|event| {
        let event = match Event::default().json_data(&event) {
            Ok(event) => event,
            Err(_) => Event::default().data("{\"type\":\"error\",\"content\":\"encoding failed\"}"),
        };
        Ok(event)
    });

    Ok(Sse::new(events))
}

/// GET /api/v1/tools
pub async fn list_tools(State(state): State<AppState>) -> Json<serde_json::Value> {
    let tools: Vec<serde_json::Value> = state
        .orchestrator
        .registry()
        .available_tools()
        .into_iter()
        .map(|(id, name, description)| {
            json!({"id": id, "name": name, "description": description})
        })
        .collect();

    Json(json!({"tools": tools}))
}

/// GET /api/v1/plugins
pub async fn list_plugins(State(state): State<AppState>) -> Json<serde_json::Value> {
    let plugins = state.orchestrator.registry().registered_plugins();
    Json(json!({"plugins": plugins}))
}

/// POST /api/v1/plugins
pub async fn register_plugin(
    State(state): State<AppState>,
    Json(manifest): Json<PluginManifest>,
) -> impl IntoResponse {
    match state.orchestrator.registry().register_plugin(manifest) {
        Ok(tool_id) => (
            StatusCode::OK,
            Json(json!({"registered": true, "tool_id": tool_id})),
        ),
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": err.to_string()})),
        ),
    }
}

/// DELETE /api/v1/plugins/{id}
pub async fn unregister_plugin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.orchestrator.registry().unregister_plugin(&id) {
        Ok(removed) => (StatusCode::OK, Json(json!({"removed": removed}))),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": err.to_string()})),
        ),
    }
}

/// GET /api/v1/health
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "models": state.orchestrator.router().available_models(),
        "tool_count": state.orchestrator.registry().len(),
    }))
}
