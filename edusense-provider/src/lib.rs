//! # edusense providers
//!
//! Provider implementations for the edusense learning assistant:
//!
//! - [`GeminiGenerator`]: Google Gemini over REST, the primary text backend
//! - [`OpenAiGenerator`]: OpenAI-compatible chat completions
//! - [`MockGenerator`]: keyword-driven canned answers for running offline
//! - [`azure`]: sentiment, face detection, ranking and expert chat clients

pub mod azure;
pub mod gemini;
mod http;
pub mod mock;
pub mod openai;

// Re-exports
pub use azure::{
    AzureCredentials, ExpertChatClient, FaceClient, PersonalizerClient, TextAnalyticsClient,
};
pub use gemini::{GeminiConfig, GeminiGenerator};
pub use http::DEFAULT_TIMEOUT;
pub use mock::MockGenerator;
pub use openai::{OpenAiBuilder, OpenAiGenerator, OpenAiSettings};
