//! End-to-end fallback chains against mocked Gemini and Azure endpoints.

use edusense::config::AppConfig;
use edusense::emotion::{EmotionalIntelligence, SentimentLabel};
use edusense::tutor::AiTutor;
use edusense::PLACEHOLDER_PROVIDER;
use serde_json::json;
use std::collections::HashMap;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";

fn config(server: &MockServer, extra: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = [
        ("GEMINI_API_KEY", "test-key".to_string()),
        ("GEMINI_BASE_URL", server.uri()),
        ("LLM_MAX_RETRIES", "0".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    AppConfig::from_vars(vars).unwrap()
}

fn azure(server: &MockServer, service: &str) -> Vec<(String, String)> {
    vec![
        (format!("{service}_ENDPOINT"), server.uri()),
        (format!("{service}_KEY"), "azure-key".to_string()),
    ]
}

fn with_azure(server: &MockServer, service: &str) -> AppConfig {
    let pairs = azure(server, service);
    let extra: Vec<(&str, &str)> = pairs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    config(server, &extra)
}

async fn mount_gemini(server: &MockServer, reply: &str) {
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{
                "name": "models/gemini-2.0-flash",
                "supportedGenerationMethods": ["generateContent"]
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": reply }] } }],
            "modelVersion": "gemini-2.0-flash"
        })))
        .mount(server)
        .await;
}

async fn mount_sentiment(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/text/analytics/v3.1/sentiment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{
                "id": "1",
                "sentiment": "negative",
                "confidenceScores": { "positive": 0.05, "neutral": 0.15, "negative": 0.8 }
            }],
            "errors": []
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_gemini_json_wins_over_text_analytics() {
    let server = MockServer::start().await;
    mount_gemini(
        &server,
        "```json\n{\"positive\": 0.7, \"neutral\": 0.2, \"negative\": 0.1, \"overall\": \"positive\",}\n```",
    )
    .await;

    let emotions = EmotionalIntelligence::from_config(&with_azure(&server, "TEXT_ANALYTICS")).await;
    let result = emotions.analyze_text("What a great lesson").await;

    assert_eq!(result.provider, "gemini");
    assert_eq!(result.value.emotions.overall, SentimentLabel::Positive);
    assert_eq!(result.value.text, "What a great lesson");
}

#[tokio::test]
async fn test_unparsable_gemini_falls_through_to_text_analytics() {
    let server = MockServer::start().await;
    mount_gemini(&server, "I'm sorry, I can't score that.").await;
    mount_sentiment(&server).await;

    let emotions = EmotionalIntelligence::from_config(&with_azure(&server, "TEXT_ANALYTICS")).await;
    let result = emotions.analyze_text("This is frustrating").await;

    assert_eq!(result.provider, "azure_text_analytics");
    assert_eq!(result.value.emotions.overall, SentimentLabel::Negative);
    assert_eq!(result.value.emotions.negative, 0.8);
    assert!(result.note.is_none());
}

#[tokio::test]
async fn test_unparsable_gemini_without_azure_gives_placeholder() {
    let server = MockServer::start().await;
    mount_gemini(&server, "no braces here").await;

    let emotions = EmotionalIntelligence::from_config(&config(&server, &[])).await;
    let result = emotions.analyze_text("hello").await;

    assert_eq!(result.provider, PLACEHOLDER_PROVIDER);
    assert_eq!(result.value.emotions.positive, 0.33);
    assert_eq!(result.value.emotions.neutral, 0.34);
    assert_eq!(result.value.emotions.overall, SentimentLabel::Neutral);
    assert!(result.note.is_some());
}

#[tokio::test]
async fn test_face_detection_with_no_faces() {
    let server = MockServer::start().await;
    mount_gemini(&server, "unused").await;
    Mock::given(method("POST"))
        .and(path("/face/v1.0/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let emotions = EmotionalIntelligence::from_config(&with_azure(&server, "FACE_API")).await;
    let result = emotions.analyze_image(b"not inspected by the face service").await;

    assert_eq!(result.provider, "azure_face");
    assert_eq!(result.value.face_count, 0);
    assert_eq!(result.value.dominant_emotion, "neutral");
    assert_eq!(
        result.value.message.as_deref(),
        Some("No faces detected in the image")
    );
}

const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52,
];

#[tokio::test]
async fn test_face_without_emotion_falls_through_to_gemini() {
    let server = MockServer::start().await;
    mount_gemini(
        &server,
        r#"{"emotions": {"happiness": 0.6, "neutral": 0.4}, "sentiment": {"positive": 0.6, "neutral": 0.4}, "dominant_emotion": "happiness", "dominant_sentiment": "positive"}"#,
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/face/v1.0/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "faceId": "f1" }])))
        .expect(1)
        .mount(&server)
        .await;

    let emotions = EmotionalIntelligence::from_config(&with_azure(&server, "FACE_API")).await;
    let result = emotions.analyze_image(PNG).await;

    assert_eq!(result.provider, "gemini");
    assert_eq!(result.value.dominant_emotion, "happiness");
    assert_eq!(result.value.emotions.anger, 0.0);
    assert_eq!(result.value.face_count, 1);
}

#[tokio::test]
async fn test_tutor_uses_gemini_resources() {
    let server = MockServer::start().await;
    mount_gemini(
        &server,
        r#"[
            {"title": "Deep Learning", "author": "Goodfellow et al.", "description": "Classic text.", "level": "Advanced", "link": "deeplearningbook.org"},
            // trimmed
            {"title": "Fast.ai", "author": "Jeremy Howard", "description": "Practical course.", "level": "Beginner", "link": "fast.ai"}
        ]"#,
    )
    .await;

    let tutor = AiTutor::from_config(config(&server, &[("LLM_SERVICE", "gemini")])).await;
    assert_eq!(tutor.current_service_info().id, "gemini");

    let resources = tutor.suggest_resources("Machine Learning", "all", 5).await;
    assert_eq!(resources.provider, "gemini");
    assert_eq!(resources.value.len(), 2);
    assert_eq!(resources.value[1].link, "fast.ai");
}
