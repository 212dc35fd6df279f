mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::mocks::{MockLLMClient, Reply};
use sage::{
    create_app,
    tools::{WeatherTool, WikipediaTool},
    utils::toml_config::{PlannerMode, SageConfig},
    AppState, ReasoningAgent, SageConfigManager, ShortTermMemory, ToolRegistry,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FINAL_REPLY: &str = "REASONING: I answered directly.\nANSWER: Hello! How can I help?";

// ============= Helpers =============

fn keyword_config() -> SageConfig {
    let mut config = SageConfig::default();
    config.planner.mode = PlannerMode::Keyword;
    config
}

fn create_test_app(llm: Arc<MockLLMClient>, tools: ToolRegistry, config: SageConfig) -> TestServer {
    let memory = Arc::new(ShortTermMemory::new(config.memory.capacity));
    let agent = Arc::new(ReasoningAgent::new(llm, Arc::new(tools)));
    let config_manager = Arc::new(SageConfigManager::from_config(config));

    let state = AppState::new(config_manager, agent, memory);
    TestServer::new(create_app(state)).unwrap()
}

fn weather_tool(server: &MockServer) -> Arc<WeatherTool> {
    Arc::new(
        WeatherTool::new(
            Some("test-weather-key".to_string()),
            format!("{}/weather", server.uri()),
            "metric",
            Duration::from_secs(5),
        )
        .unwrap(),
    )
}

fn wikipedia_tool(server: &MockServer) -> Arc<WikipediaTool> {
    Arc::new(
        WikipediaTool::new(
            &format!("{}/page/summary/", server.uri()),
            "sage-test/1.0",
            Duration::from_secs(5),
        )
        .unwrap(),
    )
}

async fn mock_paris_weather(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Paris",
            "main": { "temp": 21.0, "humidity": 40 },
            "weather": [{ "description": "clear sky" }],
            "wind": { "speed": 2.5 }
        })))
        .mount(server)
        .await;
}

async fn mock_einstein_summary(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/page/summary/Albert_Einstein"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Albert Einstein",
            "extract": "Albert Einstein was a theoretical physicist.",
            "content_urls": { "desktop": { "page": "https://en.wikipedia.org/wiki/Albert_Einstein" } }
        })))
        .mount(server)
        .await;
}

// ============= Health & Root =============

#[tokio::test]
async fn test_health_check() {
    let server = create_test_app(
        Arc::new(MockLLMClient::failing()),
        ToolRegistry::new(),
        keyword_config(),
    );

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["llm"], "mock-model");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptime_secs"].is_u64());
}

#[tokio::test]
async fn test_root_message() {
    let server = create_test_app(
        Arc::new(MockLLMClient::new(FINAL_REPLY)),
        ToolRegistry::new(),
        keyword_config(),
    );

    let response = server.get("/").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("running"));
}

// ============= Validation =============

#[tokio::test]
async fn test_blank_query_rejected() {
    let llm = Arc::new(MockLLMClient::new(FINAL_REPLY));
    let server = create_test_app(llm.clone(), ToolRegistry::new(), keyword_config());

    let response = server.post("/ask").json(&json!({ "query": "   " })).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("empty"));
    assert!(llm.calls().is_empty());
}

#[tokio::test]
async fn test_oversized_query_rejected() {
    let mut config = keyword_config();
    config.agent.max_query_chars = 10;
    let server = create_test_app(
        Arc::new(MockLLMClient::new(FINAL_REPLY)),
        ToolRegistry::new(),
        config,
    );

    let response = server
        .post("/ask")
        .json(&json!({ "query": "this query is far too long" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_body_over_limit_rejected() {
    let mut config = keyword_config();
    config.server.max_body_bytes = 64;
    let llm = Arc::new(MockLLMClient::new(FINAL_REPLY));
    let server = create_test_app(llm.clone(), ToolRegistry::new(), config);

    let response = server
        .post("/ask")
        .json(&json!({ "query": "x".repeat(256) }))
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert!(llm.calls().is_empty());
}

// ============= Ask =============

#[tokio::test]
async fn test_ask_direct_answer_is_remembered() {
    let server = create_test_app(
        Arc::new(MockLLMClient::new(FINAL_REPLY)),
        ToolRegistry::new(),
        keyword_config(),
    );

    let response = server.post("/ask").json(&json!({ "query": "hi there" })).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["reasoning"], "I answered directly.");
    assert_eq!(body["answer"], "Hello! How can I help?");
    assert_eq!(body["degraded"], false);
    assert_eq!(body["model"], "mock-model");
    assert_eq!(body["plan"]["source"], "keyword");
    assert_eq!(body["tool_failures"], json!([]));

    let memory: Value = server.get("/memory").await.json();
    assert_eq!(memory["count"], 1);
    assert_eq!(memory["entries"][0]["query"], "hi there");
    assert_eq!(memory["entries"][0]["answer"], "Hello! How can I help?");
}

#[tokio::test]
async fn test_ask_with_model_plan_fetches_weather() {
    let upstream = MockServer::start().await;
    mock_paris_weather(&upstream).await;

    let llm = Arc::new(MockLLMClient::scripted(vec![
        Reply::text(r#"{"needs_weather": true, "needs_wikipedia": false, "reasoning": "Weather question"}"#),
        Reply::text("REASONING: Used the weather API.\nANSWER: It is 21°C and clear in Paris."),
    ]));
    let mut tools = ToolRegistry::new();
    tools.register(weather_tool(&upstream));

    let server = create_test_app(llm.clone(), tools, SageConfig::default());

    let response = server
        .post("/ask")
        .json(&json!({ "query": "How's the weather in Paris today?" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["plan"]["source"], "model");
    assert_eq!(body["plan"]["location"], "Paris");
    assert_eq!(body["sources"]["weather"]["description"], "clear sky");
    assert_eq!(body["sources"]["weather"]["temperature"], 21.0);
    assert!(body["sources"]["wikipedia"].is_null());
    assert_eq!(body["answer"], "It is 21°C and clear in Paris.");

    let calls = llm.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].1.contains("clear sky"));
    assert!(calls[1].1.contains("My Analysis: Weather question"));
}

#[tokio::test]
async fn test_weather_failure_reported_not_fatal() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&upstream)
        .await;

    let mut tools = ToolRegistry::new();
    tools.register(weather_tool(&upstream));
    let llm = Arc::new(MockLLMClient::new(FINAL_REPLY));
    let server = create_test_app(llm.clone(), tools, keyword_config());

    let response = server
        .post("/ask")
        .json(&json!({ "query": "How's the weather in Paris today?" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["sources"]["weather"].is_null());
    assert_eq!(body["tool_failures"][0]["tool"], "weather");
    assert_eq!(body["tool_failures"][0]["message"], "Weather API error: 500");
    assert!(llm.calls()[0].1.contains("No external data available"));
}

#[tokio::test]
async fn test_disabled_tool_and_missing_location_reported() {
    let server = create_test_app(
        Arc::new(MockLLMClient::new(FINAL_REPLY)),
        ToolRegistry::new(),
        keyword_config(),
    );

    let body: Value = server
        .post("/ask")
        .json(&json!({ "query": "Will it snow tomorrow?" }))
        .await
        .json();
    assert_eq!(
        body["tool_failures"][0]["message"],
        "Could not extract location from query"
    );

    let body: Value = server
        .post("/ask")
        .json(&json!({ "query": "How's the weather in Paris today?" }))
        .await
        .json();
    assert_eq!(body["tool_failures"][0]["message"], "tool 'weather' is disabled");
}

#[tokio::test]
async fn test_llm_failure_is_bad_gateway_and_not_remembered() {
    let server = create_test_app(
        Arc::new(MockLLMClient::failing()),
        ToolRegistry::new(),
        keyword_config(),
    );

    let response = server.post("/ask").json(&json!({ "query": "hello" })).await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Mock LLM failure"));

    let memory: Value = server.get("/memory").await.json();
    assert_eq!(memory["count"], 0);
}

#[tokio::test]
async fn test_degraded_answer_from_wikipedia() {
    let upstream = MockServer::start().await;
    mock_einstein_summary(&upstream).await;

    let mut tools = ToolRegistry::new();
    tools.register(wikipedia_tool(&upstream));

    let mut config = SageConfig::default();
    config.agent.degraded_answers = true;

    // Planner and final call both fail: keyword plan, then degraded answer
    let server = create_test_app(Arc::new(MockLLMClient::failing()), tools, config);

    let response = server
        .post("/ask")
        .json(&json!({ "query": "Who was Albert Einstein?" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["degraded"], true);
    assert_eq!(body["plan"]["source"], "keyword");
    assert_eq!(body["plan"]["search_term"], "Albert Einstein");
    assert_eq!(
        body["answer"],
        "According to Wikipedia: Albert Einstein was a theoretical physicist."
    );
    assert_eq!(
        body["sources"]["wikipedia"]["url"],
        "https://en.wikipedia.org/wiki/Albert_Einstein"
    );

    let memory: Value = server.get("/memory").await.json();
    assert_eq!(memory["count"], 1);
}

#[tokio::test]
async fn test_history_included_when_enabled() {
    let mut config = keyword_config();
    config.memory.include_in_prompt = true;
    config.memory.prompt_window = 2;

    let llm = Arc::new(MockLLMClient::new(FINAL_REPLY));
    let server = create_test_app(llm.clone(), ToolRegistry::new(), config);

    server
        .post("/ask")
        .json(&json!({ "query": "my name is Ada" }))
        .await
        .assert_status_ok();
    server
        .post("/ask")
        .json(&json!({ "query": "what did I say?" }))
        .await
        .assert_status_ok();

    let calls = llm.calls();
    assert!(!calls[0].1.contains("Recent conversation"));
    assert!(calls[1].1.contains("User: my name is Ada"));
}

// ============= Memory =============

#[tokio::test]
async fn test_memory_is_bounded_and_most_recent_first() {
    let mut config = keyword_config();
    config.memory.capacity = 2;
    config.memory.prompt_window = 1;

    let server = create_test_app(
        Arc::new(MockLLMClient::new(FINAL_REPLY)),
        ToolRegistry::new(),
        config,
    );

    for query in ["first", "second", "third"] {
        server
            .post("/ask")
            .json(&json!({ "query": query }))
            .await
            .assert_status_ok();
    }

    let memory: Value = server.get("/memory").await.json();
    assert_eq!(memory["capacity"], 2);
    assert_eq!(memory["count"], 2);
    assert_eq!(memory["entries"][0]["query"], "third");
    assert_eq!(memory["entries"][1]["query"], "second");

    let limited: Value = server
        .get("/memory")
        .add_query_param("limit", 1)
        .await
        .json();
    assert_eq!(limited["count"], 1);
    assert_eq!(limited["entries"][0]["query"], "third");
}

#[tokio::test]
async fn test_clear_memory() {
    let server = create_test_app(
        Arc::new(MockLLMClient::new(FINAL_REPLY)),
        ToolRegistry::new(),
        keyword_config(),
    );

    server
        .post("/ask")
        .json(&json!({ "query": "remember me" }))
        .await
        .assert_status_ok();

    let response = server.delete("/memory").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["cleared"], 1);

    let memory: Value = server.get("/memory").await.json();
    assert_eq!(memory["count"], 0);
    assert_eq!(memory["entries"], json!([]));
}
