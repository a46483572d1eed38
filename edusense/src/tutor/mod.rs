//! AI tutor: explanations, practice questions, learning paths, quizzes and
//! resource suggestions on top of the selected generation service.

mod questions;
mod quiz;

pub use questions::{fit_to_count, parse_questions_from_text, PracticeQuestion};
pub use quiz::{
    display_options, feedback_for, is_correct, strip_option_prefix, GradedAnswer, Quiz,
    QuizResult,
};

use crate::config::AppConfig;
use crate::services::{connect_generator, list_available_services, ServiceDescriptor};
use edusense_core::normalize::{FieldSpec, ResponseSchema};
use edusense_core::{EduError, FallbackChain, GenerationRuntime, Normalized};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

const EXPLANATION_NOTE: &str = "The tutoring service could not generate an explanation.";
const QUESTIONS_NOTE: &str = "Practice questions could not be generated; showing placeholders.";
const LEARNING_PATH_NOTE: &str = "A learning path could not be generated; showing a generic plan.";
const RESOURCES_NOTE: &str = "Resources could not be generated; showing general suggestions.";

/// Hours reported for every learning path
const ESTIMATED_TOTAL_HOURS: u32 = 20;
/// Topic count reported for every learning path
const TOPICS_COUNT: u32 = 5;

fn explain_prompt(concept: &str) -> String {
    format!(
        r#"Explain the following educational concept in simple terms that a student could understand.
Include examples and key points:

Concept: {concept}"#
    )
}

fn questions_prompt(topic: &str, difficulty: &str, count: usize) -> String {
    format!(
        r#"Create {count} {difficulty}-level practice questions about "{topic}".
For each question, provide:
1. The question text
2. Multiple choice options (if applicable)
3. The correct answer
4. A brief explanation of the answer

Format your response as JSON with this structure:
[
  {{
    "text": "Question text here",
    "options": ["Option A", "Option B", "Option C", "Option D"],
    "answer": "The correct answer",
    "explanation": "Explanation of why this is the correct answer"
  }},
  // more questions...
]"#
    )
}

fn learning_path_prompt(topic: &str, level: &str) -> String {
    format!(
        r#"Create a structured learning path for someone wanting to learn about "{topic}" at a {level} level.

Include:
1. A sequence of 4-6 topics to learn, in order
2. For each topic, suggest 1-2 resources (books, courses, websites)
3. Estimate time needed for each topic
4. Suggest a small project or exercise to practice each topic

Format the response as a structured, markdown formatted learning plan."#
    )
}

fn resources_prompt(topic: &str, format_type: &str, max_results: usize) -> String {
    format!(
        r#"Suggest {max_results} high-quality {format_type} resources for learning about "{topic}".

For each resource, provide:
1. Title
2. Author/Creator
3. Brief description (1-2 sentences)
4. Difficulty level (Beginner, Intermediate, Advanced)
5. Link or platform (where applicable)

Format your response as JSON with this structure:
[
  {{
    "title": "Resource title",
    "author": "Resource author or creator",
    "description": "Brief description",
    "level": "Beginner/Intermediate/Advanced",
    "link": "URL or platform name"
  }},
  // more resources...
]"#
    )
}

/// Schema for a list of practice questions
pub fn questions_schema(count: usize) -> ResponseSchema {
    ResponseSchema::array(
        "practice_questions",
        vec![
            FieldSpec::required("text"),
            FieldSpec::with_default("options", Value::Array(Vec::new())),
            FieldSpec::required("answer"),
            FieldSpec::with_default("explanation", Value::from("")),
        ],
    )
    .with_max_items(count)
}

/// Schema for a list of learning resources
pub fn resources_schema(max_results: usize) -> ResponseSchema {
    ResponseSchema::array(
        "learning_resources",
        ["title", "author", "description", "level", "link"]
            .into_iter()
            .map(FieldSpec::required)
            .collect(),
    )
    .with_max_items(max_results)
}

/// A markdown learning plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    pub topic: String,
    pub level: String,
    pub path: String,
    pub estimated_total_hours: u32,
    pub topics_count: u32,
}

impl LearningPath {
    fn new(topic: &str, level: &str, path: String) -> Self {
        Self {
            topic: topic.to_string(),
            level: level.to_string(),
            path,
            estimated_total_hours: ESTIMATED_TOTAL_HOURS,
            topics_count: TOPICS_COUNT,
        }
    }

    fn placeholder(topic: &str, level: &str) -> Self {
        let path = format!(
            "# Learning Path: {topic} ({level})\n\n\
             ## 1. Fundamentals\n- Review the core vocabulary and ideas of {topic}.\n\n\
             ## 2. Guided Practice\n- Work through introductory exercises.\n\n\
             ## 3. Projects\n- Build a small project that applies what you learned.\n\n\
             ## 4. Going Further\n- Explore advanced material and share your work."
        );
        Self::new(topic, level, path)
    }
}

/// A suggested book, course, video or website
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    pub title: String,
    pub author: String,
    pub description: String,
    pub level: String,
    pub link: String,
}

impl LearningResource {
    fn placeholders(topic: &str) -> Vec<Self> {
        vec![
            Self {
                title: format!("Introduction to {topic}"),
                author: "Various Authors".to_string(),
                description: format!("A comprehensive introduction to {topic}."),
                level: "Beginner".to_string(),
                link: "www.example.com".to_string(),
            },
            Self {
                title: format!("Advanced {topic} Techniques"),
                author: "Expert Author".to_string(),
                description: format!("In-depth coverage of advanced {topic} concepts."),
                level: "Advanced".to_string(),
                link: "www.example.com/advanced".to_string(),
            },
        ]
    }
}

/// Tutoring assistant bound to one generation service at a time.
#[derive(Debug)]
pub struct AiTutor {
    runtime: GenerationRuntime,
    config: AppConfig,
    services: Vec<ServiceDescriptor>,
}

impl AiTutor {
    /// Connect the service named by `config.llm_service`.
    pub async fn from_config(config: AppConfig) -> Self {
        let runtime = connect_generator(&config.llm_service, &config).await;
        Self::with_runtime(runtime, config)
    }

    /// Use an already composed runtime
    pub fn with_runtime(runtime: GenerationRuntime, config: AppConfig) -> Self {
        let services = list_available_services(&config);
        Self {
            runtime,
            config,
            services,
        }
    }

    /// Switch to another service; unknown or unready services become the mock.
    pub async fn change_service(&mut self, name: &str) {
        self.runtime = connect_generator(name, &self.config).await;
        tracing::info!(requested = name, active = %self.runtime.id(), "switched LLM service");
    }

    /// Descriptor of the active service
    pub fn current_service_info(&self) -> ServiceDescriptor {
        let id = self.runtime.id();
        self.services
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .unwrap_or_else(|| ServiceDescriptor {
                id: "unknown".to_string(),
                name: "Unknown".to_string(),
                description: "Unknown service".to_string(),
                configured: false,
            })
    }

    pub fn available_services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    pub fn runtime(&self) -> &GenerationRuntime {
        &self.runtime
    }

    /// Explain a concept in plain language
    pub async fn explain_concept(&self, concept: &str) -> Normalized<String> {
        let runtime = &self.runtime;

        FallbackChain::new("explain_concept")
            .step(runtime.id(), runtime.state(), async move {
                let result = runtime.generate_text(explain_prompt(concept)).await?;
                Ok(result.content)
            })
            .resolve(EXPLANATION_NOTE, || {
                format!("An explanation of \"{concept}\" is not available right now. Please try again later.")
            })
            .await
    }

    /// Exactly `count` practice questions.
    ///
    /// The model is asked once. A JSON answer is used as is; otherwise the
    /// same text is parsed line by line and padded with placeholders.
    pub async fn create_practice_questions(
        &self,
        topic: &str,
        difficulty: &str,
        count: usize,
    ) -> Normalized<Vec<PracticeQuestion>> {
        let runtime = &self.runtime;
        let schema = questions_schema(count);
        let prompt = questions_prompt(topic, difficulty, count);
        let slot: Mutex<Option<String>> = Mutex::new(None);
        let raw = &slot;

        FallbackChain::new("create_practice_questions")
            .step(runtime.id(), runtime.state(), async move {
                match runtime.generate_value(prompt, &schema).await {
                    Ok(value) => Ok(serde_json::from_value::<Vec<PracticeQuestion>>(value)?),
                    Err(err) => {
                        if let Some(text) = err.raw_text() {
                            *raw.lock().await = Some(text.to_string());
                        }
                        Err(err.into())
                    }
                }
            })
            .step(runtime.id(), runtime.state(), async move {
                let text = raw
                    .lock()
                    .await
                    .take()
                    .ok_or_else(|| EduError::provider("no response text to parse"))?;
                let parsed = parse_questions_from_text(&text);
                if parsed.is_empty() {
                    return Err(EduError::provider("no questions found in response text"));
                }
                tracing::debug!(parsed = parsed.len(), count, "parsed questions from text");
                Ok(fit_to_count(parsed, count))
            })
            .resolve(QUESTIONS_NOTE, || fit_to_count(Vec::new(), count))
            .await
    }

    /// A markdown learning plan for `topic` at `level`
    pub async fn generate_learning_path(&self, topic: &str, level: &str) -> Normalized<LearningPath> {
        let runtime = &self.runtime;

        FallbackChain::new("generate_learning_path")
            .step(runtime.id(), runtime.state(), async move {
                let result = runtime
                    .generate_text(learning_path_prompt(topic, level))
                    .await?;
                Ok(LearningPath::new(topic, level, result.content))
            })
            .resolve(LEARNING_PATH_NOTE, || LearningPath::placeholder(topic, level))
            .await
    }

    /// A quiz built from practice questions
    pub async fn generate_quiz(
        &self,
        topic: &str,
        difficulty: &str,
        count: usize,
    ) -> Normalized<Quiz> {
        self.create_practice_questions(topic, difficulty, count)
            .await
            .map(|questions| Quiz {
                topic: topic.to_string(),
                difficulty: difficulty.to_string(),
                questions,
            })
    }

    /// Up to `max_results` resources; two general ones when generation fails.
    pub async fn suggest_resources(
        &self,
        topic: &str,
        format_type: &str,
        max_results: usize,
    ) -> Normalized<Vec<LearningResource>> {
        let runtime = &self.runtime;
        let schema = resources_schema(max_results);

        FallbackChain::new("suggest_resources")
            .step(runtime.id(), runtime.state(), async move {
                let resources: Vec<LearningResource> = runtime
                    .generate_structured(resources_prompt(topic, format_type, max_results), &schema)
                    .await?;
                Ok(resources)
            })
            .resolve(RESOURCES_NOTE, || LearningResource::placeholders(topic))
            .await
    }
}
