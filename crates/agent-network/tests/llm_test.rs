use confhub_agent_network::{AgentError, BlockingBridge, GeminiModel, LanguageModel};
use confhub_common::{AgentConfig, LlmConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn model(server: &MockServer) -> GeminiModel {
    let llm = LlmConfig {
        api_key: None,
        base_url: server.uri(),
        request_timeout_secs: 5,
    };
    let agent = AgentConfig {
        model: "gemini-2.0-flash".to_string(),
        temperature: 0.5,
    };
    GeminiModel::new(&llm, "test-key", &agent, BlockingBridge::current()).unwrap()
}

fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3, "totalTokenCount": 15},
        "modelVersion": "gemini-2.0-flash"
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_generate_content_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"/models/gemini-2\.0-flash:generateContent$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("Hi there")))
        .expect(1)
        .mount(&server)
        .await;
    let model = model(&server);

    let text = tokio::task::spawn_blocking(move || model.complete("be nice", "hello"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(text, "Hi there");
    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).to_string();
    assert!(body.contains("be nice"), "system instruction missing: {}", body);
    assert!(body.contains("hello"), "prompt missing: {}", body);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_api_error_is_llm_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;
    let model = model(&server);

    let err = tokio::task::spawn_blocking(move || model.complete("system", "hello"))
        .await
        .unwrap()
        .unwrap_err();

    assert!(matches!(&err, AgentError::Llm(msg) if msg.contains("quota exceeded")), "{}", err);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_empty_candidates_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;
    let model = model(&server);

    let result = tokio::task::spawn_blocking(move || model.complete("system", "hello"))
        .await
        .unwrap();

    assert!(result.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unanswered_request_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_reply("too late"))
                .set_delay(std::time::Duration::from_secs(10)),
        )
        .mount(&server)
        .await;
    let llm = LlmConfig {
        api_key: None,
        base_url: server.uri(),
        request_timeout_secs: 1,
    };
    let agent = AgentConfig {
        model: "gemini-2.0-flash".to_string(),
        temperature: 0.1,
    };
    let model = GeminiModel::new(&llm, "test-key", &agent, BlockingBridge::current()).unwrap();

    let err = tokio::task::spawn_blocking(move || model.complete("system", "hello"))
        .await
        .unwrap()
        .unwrap_err();

    assert!(matches!(err, AgentError::Bridge(_)), "{}", err);
}

#[test]
fn test_empty_api_key_rejected() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let result = GeminiModel::new(
        &LlmConfig::default(),
        "  ",
        &AgentConfig {
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.3,
        },
        BlockingBridge::new(runtime.handle().clone()),
    );

    assert!(matches!(result, Err(AgentError::Llm(_))));
}
