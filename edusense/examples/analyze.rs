//! End-to-end walk through the learning assistant.
//!
//! Runs without any credentials: unconfigured services are skipped and the
//! tutor falls back to the mock generator. Set `GEMINI_API_KEY` or the Azure
//! endpoint/key pairs in `.env` to exercise the real backends.
//!
//! ```text
//! cargo run --example analyze -- "I finally understand recursion!"
//! ```

use edusense::prelude::*;
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    let text = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "I love learning new things, but exams make me nervous.".into());

    // Emotion analysis
    let emotions = EmotionalIntelligence::from_config(&config).await;
    let sentiment = emotions.analyze_emotions(EmotionInput::Text(text)).await;
    println!("== Emotion ({}) ==", sentiment.provider());
    println!("{}", serde_json::to_string_pretty(&sentiment)?);

    // Collaborative intelligence
    let collaborative = CollaborativeIntelligence::from_config(&config);
    let recommendations = collaborative
        .get_personalized_recommendations(json!({"level": "beginner"}))
        .await;
    let learner = collaborative.create_learning_profile(&serde_json::Map::new());
    println!("\n== Recommendations ==\n{recommendations:?}");
    println!("{}", collaborative.chat_with_expert("How should I revise for exams?"));

    let profile = create_cognitive_emotional_profile(&sentiment, &learner)?;
    println!("\n== Profile ==\n{:?}", profile.summary());

    // Tutoring
    println!("\n== Services ==");
    for service in list_available_services(&config) {
        println!("- {} ({}) configured={}", service.name, service.id, service.configured);
    }

    let tutor = AiTutor::from_config(config).await;
    println!("Using: {}", tutor.current_service_info().name);

    let quiz = tutor.generate_quiz("World History", "Beginner", 3).await;
    println!("\n== Quiz ({}) ==", quiz.provider);
    for (i, question) in quiz.value.questions.iter().enumerate() {
        println!("{}. {}", i + 1, question.text);
    }

    let answers: Vec<String> = quiz
        .value
        .questions
        .iter()
        .map(|q| q.answer.clone())
        .collect();
    let result = quiz.value.grade(&answers);
    println!(
        "Score: {}/{} ({:.1}%) {}",
        result.correct, result.total, result.percentage, result.feedback
    );

    let resources = tutor.suggest_resources("Machine Learning", "books", 3).await;
    println!("\n== Resources ({}) ==", resources.provider);
    for resource in &resources.value {
        println!("- {} by {} [{}]", resource.title, resource.author, resource.level);
    }

    Ok(())
}
