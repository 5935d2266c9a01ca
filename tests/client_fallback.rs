//! OpenRouter client behavior against a mock chat-completions server.

use std::time::{Duration, Instant};

use docsum::llm::{LlmConfig, OpenRouterClient, SummarizationClient, OMISSION_MARKER};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "sk-or-v1-test";

fn config(endpoint: &str, models: &[&str]) -> LlmConfig {
    LlmConfig {
        request_delay: 0.0,
        retry_min_delay: 0.01,
        retry_max_delay: 0.05,
        ..LlmConfig::default()
    }
    .with_api_key(KEY)
    .with_endpoint(endpoint)
    .with_models("balanced", models)
}

fn answer(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": text } }]
    }))
}

async fn mount_for(server: &MockServer, model: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": model })))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_falls_back_until_a_model_answers() {
    let server = MockServer::start().await;
    mount_for(&server, "a/one", ResponseTemplate::new(503), 1).await;
    mount_for(&server, "b/two", ResponseTemplate::new(402), 1).await;
    mount_for(&server, "c/three", answer("Summary: Supply contract"), 1).await;

    let client =
        OpenRouterClient::new(config(&server.uri(), &["a/one", "b/two", "c/three"])).unwrap();
    let outcome = client.summarize("CONTRACT No. 5", 0.3, None).await;

    assert!(outcome.success);
    assert_eq!(outcome.model_used, "c/three");
    assert_eq!(outcome.summary.as_deref(), Some("Supply contract"));
    assert!(outcome.fallback_used);
    assert!(outcome.metadata.fallback_used);
    assert!(outcome.metadata.attempted_models.is_empty());
}

#[tokio::test]
async fn test_first_model_success_is_not_a_fallback() {
    let server = MockServer::start().await;
    mount_for(&server, "a/one", answer("Invoice for 100 RUB"), 1).await;
    mount_for(&server, "b/two", answer("unused"), 0).await;

    let client = OpenRouterClient::new(config(&server.uri(), &["a/one", "b/two"])).unwrap();
    let outcome = client.summarize("invoice", 0.3, None).await;

    assert!(outcome.success);
    assert!(!outcome.fallback_used);
    assert_eq!(outcome.metadata.tokens_output, Some("Invoice for 100 RUB".len() / 4));
}

#[tokio::test]
async fn test_all_models_failing_is_reported_not_raised() {
    let server = MockServer::start().await;
    let invalid = ResponseTemplate::new(400)
        .set_body_string(r#"{"error":{"message":"is not a valid model ID"}}"#);
    mount_for(&server, "a/one", invalid.clone(), 1).await;
    mount_for(&server, "b/two", invalid, 1).await;

    let client = OpenRouterClient::new(config(&server.uri(), &["a/one", "b/two"])).unwrap();
    let outcome = client.summarize("text", 0.3, None).await;

    assert!(!outcome.success);
    assert!(outcome.summary.is_none());
    assert_eq!(outcome.model_used, "a/one");
    assert_eq!(outcome.metadata.attempted_models, vec!["a/one", "b/two"]);
    let error = outcome.error.unwrap();
    assert!(error.starts_with("All models unavailable. Last error: "));
    assert!(error.contains("b/two"));
}

#[tokio::test]
async fn test_rate_limit_is_retried_before_falling_back() {
    let server = MockServer::start().await;
    mount_for(&server, "a/one", ResponseTemplate::new(429), 2).await;
    mount_for(&server, "b/two", answer("Act of acceptance"), 1).await;

    let client = OpenRouterClient::new(config(&server.uri(), &["a/one", "b/two"])).unwrap();
    let outcome = client.summarize("act", 0.3, None).await;

    assert!(outcome.success);
    assert_eq!(outcome.model_used, "b/two");
}

#[tokio::test]
async fn test_empty_answer_moves_to_next_model() {
    let server = MockServer::start().await;
    mount_for(&server, "a/one", answer("   "), 1).await;
    mount_for(&server, "b/two", answer("Letter"), 1).await;

    let client = OpenRouterClient::new(config(&server.uri(), &["a/one", "b/two"])).unwrap();
    let outcome = client.summarize("letter", 0.3, None).await;

    assert_eq!(outcome.model_used, "b/two");
    assert_eq!(outcome.summary.as_deref(), Some("Letter"));
}

#[tokio::test]
async fn test_sends_identifying_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", format!("Bearer {}", KEY).as_str()))
        .and(header("x-title", "ocr-app"))
        .and(header("http-referer", "ocr-app.local"))
        .respond_with(answer("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenRouterClient::new(config(&server.uri(), &["a/one"])).unwrap();
    assert!(client.summarize("x", 0.3, None).await.success);
}

#[tokio::test]
async fn test_long_text_is_truncated_to_first_model_budget() {
    let server = MockServer::start().await;
    mount_for(&server, "a/one", answer("Short"), 1).await;

    let config = config(&server.uri(), &["a/one"]).with_context_limit("a/one", 1000);
    let client = OpenRouterClient::new(config).unwrap();
    let text = format!("{}MIDDLE{}", "a".repeat(700), "z".repeat(794));
    let outcome = client.summarize(&text, 0.3, None).await;

    assert!(outcome.success);
    assert!(outcome.metadata.truncated);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains(OMISSION_MARKER));
    assert!(!prompt.contains("MIDDLE"));
    assert!(prompt.contains(&"z".repeat(300)));
    assert!(!prompt.contains(&"z".repeat(301)));
}

#[tokio::test]
async fn test_requests_are_paced() {
    let server = MockServer::start().await;
    mount_for(&server, "a/one", answer("ok"), 2).await;

    let config = LlmConfig {
        request_delay: 0.3,
        ..config(&server.uri(), &["a/one"])
    };
    let client = OpenRouterClient::new(config).unwrap();

    let started = Instant::now();
    client.summarize("first", 0.3, None).await;
    client.summarize("second", 0.3, None).await;
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_connection_failure_is_retried_then_reported() {
    let client = OpenRouterClient::new(config("http://127.0.0.1:1", &["a/one"])).unwrap();
    let outcome = client.summarize("text", 0.3, None).await;

    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("Transient error"));
}

#[test]
fn test_key_must_look_like_openrouter_key() {
    let config = LlmConfig::default().with_api_key("not-a-key");
    assert!(OpenRouterClient::new(config).is_err());
}
