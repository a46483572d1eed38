//! Offline generator with canned, keyword-driven answers.

use async_trait::async_trait;
use edusense_core::error::EduError;
use edusense_core::provider::{ServiceProvider, TextGenerator};
use edusense_core::types::*;
use std::sync::Arc;

const MOCK_QUESTIONS: &str = "Question 1: What is the capital of France?
A. London
B. Paris
C. Berlin
D. Madrid

Answer: B. Paris

Explanation: Paris is the capital and largest city of France.

Question 2: What is 2+2?
A. 3
B. 4
C. 5
D. 6

Answer: B. 4

Explanation: Basic arithmetic shows that 2+2=4.";

const MOCK_LEARNING_PATH: &str = "# Learning Path

## 1. Fundamentals (2 weeks)
- Resource: \"Introduction to the Topic\" by Author Name
- Project: Build a simple application

## 2. Intermediate Concepts (3 weeks)
- Resource: Online course at example.com
- Project: Extend your application with advanced features

## 3. Advanced Topics (4 weeks)
- Resource: \"Expert Guide\" by Another Author
- Project: Build a complex system using all concepts";

const MOCK_DEFAULT: &str = "This is a mock response from the AI model.";

/// Generator for running without API keys. Always `Ready`.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    info: Arc<ProviderInfo>,
}

impl MockGenerator {
    /// Create the mock generator
    pub fn new() -> Self {
        Self {
            info: Arc::new(ProviderInfo::new(
                "mock",
                "Mock LLM",
                "Mock LLM for testing without API keys",
            )),
        }
    }

    fn respond(prompt: &str) -> String {
        let lowered = prompt.to_lowercase();
        if lowered.contains("concept") {
            format!(
                "This is a mock explanation of the concept in the prompt: {}",
                tail(prompt, 100)
            )
        } else if lowered.contains("questions") {
            MOCK_QUESTIONS.to_string()
        } else if lowered.contains("learning path") {
            MOCK_LEARNING_PATH.to_string()
        } else {
            MOCK_DEFAULT.to_string()
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn tail(text: &str, chars: usize) -> &str {
    let start = text
        .char_indices()
        .rev()
        .nth(chars.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    &text[start..]
}

impl ServiceProvider for MockGenerator {
    fn info(&self) -> Arc<ProviderInfo> {
        self.info.clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate_text(&self, req: TextRequest) -> Result<TextResult, EduError> {
        Ok(TextResult {
            content: Self::respond(&req.prompt),
            model: "mock".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keyword_responses() {
        let mock = MockGenerator::new();

        let concept = mock
            .generate_text(TextRequest::new("Explain the concept of recursion"))
            .await
            .unwrap();
        assert!(concept.content.starts_with("This is a mock explanation"));
        assert!(concept.content.ends_with("Explain the concept of recursion"));

        let questions = mock
            .generate_text(TextRequest::new("Create 2 practice questions"))
            .await
            .unwrap();
        assert!(questions.content.contains("capital of France"));

        let path = mock
            .generate_text(TextRequest::new("Build a learning path for Rust"))
            .await
            .unwrap();
        assert!(path.content.starts_with("# Learning Path"));

        let other = mock.generate_text(TextRequest::new("hello")).await.unwrap();
        assert_eq!(other.content, MOCK_DEFAULT);
    }

    #[test]
    fn test_tail_is_char_safe() {
        assert_eq!(tail("héllo", 3), "llo");
        assert_eq!(tail("hi", 100), "hi");
    }

    #[test]
    fn test_always_ready() {
        assert!(MockGenerator::new().state().is_ready());
        assert_eq!(MockGenerator::new().id(), "mock");
    }
}
