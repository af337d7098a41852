// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nexus::config::Settings;
use nexus::fallback::fallback_response;
use nexus::llm::mock_provider::MockProvider;
use nexus::llm::router::{LlmRouter, Tier};
use nexus::memory::{LongTermMemory, ShortTermMemory};
use nexus::orchestrator::{ChatEvent, ChatRequest, Orchestrator};
use nexus::prompt::Mode;
use nexus::tools::builtin::MarketPriceTool;
use nexus::tools::ToolRegistry;

async fn price_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bitcoin": {"usd": 50000.0, "usd_24h_change": 1.5, "usd_market_cap": 1.0e12}
        })))
        .mount(&server)
        .await;
    server
}

fn price_registry(server: &MockServer) -> ToolRegistry {
    let registry = ToolRegistry::empty();
    registry.register(Arc::new(MarketPriceTool::with_base_url(server.uri())));
    registry
}

fn orchestrator(registry: ToolRegistry, router: LlmRouter) -> Orchestrator {
    Orchestrator::new(
        registry,
        Arc::new(router),
        ShortTermMemory::disabled(),
        LongTermMemory::disabled(),
        &Settings::default(),
    )
}

async fn collect(orchestrator: &Orchestrator, request: ChatRequest) -> Vec<ChatEvent> {
    let stream = orchestrator.run(request);
    futures::pin_mut!(stream);
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event);
    }
    events
}

fn reconstruct_tokens(events: &[ChatEvent]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            ChatEvent::Token { content } => Some(content.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_price_request_with_provider_streams_full_contract() {
    let server = price_server().await;
    let provider = MockProvider::new().with_tokens(&["Bitcoin ", "is ", "up."]);
    let router = LlmRouter::new(None, Some(Arc::new(provider)));
    let orchestrator = orchestrator(price_registry(&server), router);

    let events = collect(
        &orchestrator,
        ChatRequest::new("What's the price of bitcoin right now?", "user-1"),
    )
    .await;

    // At least one tool_result naming the price source
    let tool_events: Vec<&ChatEvent> = events
        .iter()
        .filter(|e| matches!(e, ChatEvent::ToolResult { .. }))
        .collect();
    assert!(!tool_events.is_empty());
    assert!(tool_events.iter().all(|e| matches!(
        e,
        ChatEvent::ToolResult { tool, .. } if tool == "CoinGecko"
    )));

    // Tool results strictly precede the first token
    let first_token = events
        .iter()
        .position(|e| matches!(e, ChatEvent::Token { .. }))
        .unwrap();
    let last_tool = events
        .iter()
        .rposition(|e| matches!(e, ChatEvent::ToolResult { .. }))
        .unwrap();
    assert!(last_tool < first_token);

    // Tokens in generation order, then exactly one terminal done
    assert_eq!(reconstruct_tokens(&events), "Bitcoin is up.");
    assert_eq!(events.last(), Some(&ChatEvent::Done));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, ChatEvent::Done | ChatEvent::Error { .. }))
            .count(),
        1
    );
}

#[tokio::test]
async fn test_provider_receives_tool_data_in_system_prompt() {
    let server = price_server().await;
    let provider = MockProvider::new().with_tokens(&["ok"]);
    let router = LlmRouter::new(None, Some(Arc::new(provider.clone())));
    let orchestrator = orchestrator(price_registry(&server), router);

    let _ = collect(
        &orchestrator,
        ChatRequest::new("bitcoin price now", "user-1"),
    )
    .await;

    let request = provider.last_request().unwrap();
    assert!(request.system.contains("Live Data (Retrieved Just Now)"));
    assert!(request.system.contains("CoinGecko"));
    assert_eq!(request.user, "bitcoin price now");
}

#[tokio::test]
async fn test_tier_selects_output_budget() {
    let provider = MockProvider::new().with_tokens(&["ok"]);
    let router = LlmRouter::new(None, Some(Arc::new(provider.clone())));
    let orchestrator = orchestrator(ToolRegistry::empty(), router);

    let _ = collect(
        &orchestrator,
        ChatRequest::new("hello", "user-1").with_tier(Tier::Pro),
    )
    .await;
    assert_eq!(provider.last_request().unwrap().max_tokens, 1500);

    let _ = collect(
        &orchestrator,
        ChatRequest::new("hello", "user-1").with_tier(Tier::Free),
    )
    .await;
    assert_eq!(provider.last_request().unwrap().max_tokens, 1024);
}

#[tokio::test]
async fn test_demo_mode_streams_deterministic_response() {
    let orchestrator = orchestrator(ToolRegistry::empty(), LlmRouter::new(None, None));

    let first = collect(&orchestrator, ChatRequest::new("hello there", "user-1")).await;
    let second = collect(&orchestrator, ChatRequest::new("hello there", "user-1")).await;

    assert!(matches!(first.last(), Some(ChatEvent::Done)));
    assert_eq!(reconstruct_tokens(&first), reconstruct_tokens(&second));

    // The streamed tokens reconstruct the responder's output word list
    let expected: String = fallback_response("hello there", &[], Mode::Analyst)
        .split_whitespace()
        .map(|w| format!("{w} "))
        .collect();
    assert_eq!(reconstruct_tokens(&first), expected);
}

#[tokio::test]
async fn test_demo_mode_still_emits_tool_results_first() {
    let server = price_server().await;
    let orchestrator = orchestrator(price_registry(&server), LlmRouter::new(None, None));

    let events = collect(
        &orchestrator,
        ChatRequest::new("btc price right now", "user-1"),
    )
    .await;

    assert!(matches!(events.first(), Some(ChatEvent::ToolResult { .. })));
    assert!(matches!(events.last(), Some(ChatEvent::Done)));
    // Demo responder rendered the fetched price
    assert!(reconstruct_tokens(&events).contains("$50000"));
}

#[tokio::test]
async fn test_mid_stream_failure_emits_single_terminal_error() {
    let provider = MockProvider::new()
        .with_tokens(&["one ", "two ", "three "])
        .with_error_after(2);
    let router = LlmRouter::new(None, Some(Arc::new(provider)));
    let orchestrator = orchestrator(ToolRegistry::empty(), router);

    let events = collect(&orchestrator, ChatRequest::new("hello", "user-1")).await;

    // Previously emitted tokens are preserved
    assert_eq!(reconstruct_tokens(&events), "one two ");
    // Exactly one terminal event, which is the error, and nothing after
    match events.last() {
        Some(ChatEvent::Error { content }) => {
            // Generic message, no internal detail leaked
            assert!(!content.contains("mock"));
        }
        other => panic!("expected terminal error, got {other:?}"),
    }
    assert!(!events.iter().any(|e| matches!(e, ChatEvent::Done)));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, ChatEvent::Error { .. }))
            .count(),
        1
    );
}

#[tokio::test]
async fn test_start_failure_without_fallback_emits_error() {
    let provider = MockProvider::new().with_start_failure();
    let router = LlmRouter::new(None, Some(Arc::new(provider)));
    let orchestrator = orchestrator(ToolRegistry::empty(), router);

    let events = collect(&orchestrator, ChatRequest::new("hello", "user-1")).await;
    assert!(matches!(events.last(), Some(ChatEvent::Error { .. })));
}

#[tokio::test]
async fn test_exchange_persisted_to_short_term_memory() {
    let memory_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pipeline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&memory_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/lrange/stm:user-1/0/19"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": []})),
        )
        .mount(&memory_server)
        .await;

    let provider = MockProvider::new().with_tokens(&["answer"]);
    let orchestrator = Orchestrator::new(
        ToolRegistry::empty(),
        Arc::new(LlmRouter::new(None, Some(Arc::new(provider)))),
        ShortTermMemory::new(Some(memory_server.uri()), Some("token".to_string())),
        LongTermMemory::disabled(),
        &Settings::default(),
    );

    let events = collect(&orchestrator, ChatRequest::new("hello", "user-1")).await;
    assert!(matches!(events.last(), Some(ChatEvent::Done)));

    // Persistence is fire-and-forget; give the spawned task a moment
    tokio::time::sleep(Duration::from_millis(200)).await;

    let pipeline_posts = memory_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/pipeline")
        .count();
    // One append for the user turn, one for the assistant turn
    assert_eq!(pipeline_posts, 2);
}

#[tokio::test]
async fn test_portfolio_message_persisted_to_long_term() {
    let vector_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/match_memories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&vector_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/memories"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&vector_server)
        .await;

    let provider = MockProvider::new().with_tokens(&["noted"]);
    let orchestrator = Orchestrator::new(
        ToolRegistry::empty(),
        Arc::new(LlmRouter::new(None, Some(Arc::new(provider)))),
        ShortTermMemory::disabled(),
        LongTermMemory::new(Some(vector_server.uri()), Some("key".to_string())),
        &Settings::default(),
    );

    let events = collect(
        &orchestrator,
        ChatRequest::new("I hold 2 BTC and 10 ETH", "user-1"),
    )
    .await;
    assert!(matches!(events.last(), Some(ChatEvent::Done)));

    tokio::time::sleep(Duration::from_millis(200)).await;

    let inserts: Vec<_> = memory_inserts(&vector_server).await;
    assert_eq!(inserts.len(), 1);
    assert_eq!(inserts[0]["memory_type"], "portfolio");
    assert_eq!(inserts[0]["content"], "I hold 2 BTC and 10 ETH");
}

#[tokio::test]
async fn test_plain_question_not_persisted_to_long_term() {
    let vector_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/match_memories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&vector_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/memories"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&vector_server)
        .await;

    let provider = MockProvider::new().with_tokens(&["hi"]);
    let orchestrator = Orchestrator::new(
        ToolRegistry::empty(),
        Arc::new(LlmRouter::new(None, Some(Arc::new(provider)))),
        ShortTermMemory::disabled(),
        LongTermMemory::new(Some(vector_server.uri()), Some("key".to_string())),
        &Settings::default(),
    );

    let _ = collect(&orchestrator, ChatRequest::new("hello", "user-1")).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(memory_inserts(&vector_server).await.is_empty());
}

async fn memory_inserts(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/rest/v1/memories")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_cancellation_drops_cleanly() {
    let provider = MockProvider::new().with_tokens(&["a", "b", "c", "d"]);
    let router = LlmRouter::new(None, Some(Arc::new(provider)));
    let orchestrator = orchestrator(ToolRegistry::empty(), router);

    let stream = orchestrator.run(ChatRequest::new("hello", "user-1"));
    futures::pin_mut!(stream);

    // Consume one event, then drop the stream mid-flight
    let first = stream.next().await;
    assert!(first.is_some());
    drop(stream);
}
