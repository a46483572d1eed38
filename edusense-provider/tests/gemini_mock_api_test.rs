//! Mock API tests for the Gemini generator.
//!
//! Response bodies follow the public `models.list` and
//! `models.generateContent` REST formats.

use edusense_core::error::EduError;
use edusense_core::provider::{ServiceProvider, TextGenerator};
use edusense_core::types::TextRequest;
use edusense_provider::gemini::{GeminiConfig, GeminiGenerator};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn models_response() -> serde_json::Value {
    json!({
        "models": [
            {
                "name": "models/gemini-1.5-pro",
                "supportedGenerationMethods": ["generateContent", "countTokens"]
            },
            {
                "name": "models/gemini-1.5-flash",
                "supportedGenerationMethods": ["generateContent"]
            },
            {
                "name": "models/embedding-001",
                "supportedGenerationMethods": ["embedContent"]
            }
        ]
    })
}

fn generate_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP"
        }],
        "modelVersion": "gemini-1.5-flash-002"
    })
}

async fn mount_models(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(models_response()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_connect_falls_back_to_available_model() {
    let server = MockServer::start().await;
    mount_models(&server).await;

    let generator =
        GeminiGenerator::connect(GeminiConfig::new("test-key").with_base_url(server.uri())).await;

    assert!(generator.state().is_ready());
    assert_eq!(generator.model(), "gemini-1.5-flash");
}

#[tokio::test]
async fn test_list_models_filters_generate_content() {
    let server = MockServer::start().await;
    mount_models(&server).await;

    let generator = GeminiGenerator::new(GeminiConfig::new("test-key").with_base_url(server.uri()));
    let models = generator.list_models().await.unwrap();

    assert_eq!(models, vec!["gemini-1.5-pro", "gemini-1.5-flash"]);
}

#[tokio::test]
async fn test_generate_text_sends_params_and_system_instruction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Return JSON" }] }],
            "systemInstruction": { "parts": [{ "text": "only json" }] },
            "generationConfig": { "maxOutputTokens": 1024, "topK": 40 }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(generate_response("{\"ok\": true}")),
        )
        .mount(&server)
        .await;

    let generator = GeminiGenerator::new(GeminiConfig::new("test-key").with_base_url(server.uri()));
    let result = generator
        .generate_text(TextRequest::new("Return JSON").with_system("only json"))
        .await
        .unwrap();

    assert_eq!(result.content, "{\"ok\": true}");
    assert_eq!(result.model, "gemini-1.5-flash-002");
}

#[tokio::test]
async fn test_generate_text_maps_http_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED" }
        })))
        .mount(&server)
        .await;

    let generator = GeminiGenerator::new(GeminiConfig::new("test-key").with_base_url(server.uri()));
    let err = generator
        .generate_text(TextRequest::new("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, EduError::RateLimit(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_blocked_prompt_is_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let generator = GeminiGenerator::new(GeminiConfig::new("test-key").with_base_url(server.uri()));
    let err = generator
        .generate_text(TextRequest::new("hello"))
        .await
        .unwrap_err();

    match err {
        EduError::Provider(msg) => assert!(msg.contains("SAFETY")),
        other => panic!("unexpected error: {other:?}"),
    }
}
