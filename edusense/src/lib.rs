//! # EduSense
//!
//! Emotion-aware learning assistant built on LLM fallback chains.
//!
//! Every service call resolves through an ordered chain of providers (a
//! generative model, a cloud service, a fixed placeholder) and returns a
//! [`Normalized`] value tagged with the provider that produced it. Resolving
//! a chain never fails.
//!
//! ## Quick Start
//!
//! ```ignore
//! use edusense::prelude::*;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! init_logging(&config.logging)?;
//!
//! let emotions = EmotionalIntelligence::from_config(&config).await;
//! let result = emotions.analyze_text("I finally understand recursion!").await;
//! println!("{:?} via {}", result.value.emotions.overall, result.provider);
//!
//! let tutor = AiTutor::from_config(config).await;
//! let quiz = tutor.generate_quiz("World History", "Beginner", 5).await;
//! println!("{} questions", quiz.value.questions.len());
//! # Ok(())
//! # }
//! ```

// Re-export core types and traits
pub use edusense_core::*;

// Re-export providers under `provider` module
pub mod provider {
    //! Generation backends and cloud service clients.
    pub use edusense_provider::*;
}

// Re-export layers under `layer` module
pub mod layer {
    //! Built-in generator layers.
    pub use edusense_layer::*;
}

pub mod collaborative;
pub mod config;
pub mod emotion;
pub mod profile;
pub mod services;
pub mod telemetry;
pub mod tutor;

#[cfg(test)]
mod test_support;

/// Prelude module for convenient imports
pub mod prelude {
    //! Prelude module containing the most commonly used types and traits.
    //!
    //! ```
    //! use edusense::prelude::*;
    //! ```

    pub use crate::{
        EduError, FallbackChain, GenerationRuntime, Normalized, ResponseSchema, Result,
        ServiceProvider, TextGenerator,
    };

    pub use crate::collaborative::CollaborativeIntelligence;
    pub use crate::config::AppConfig;
    pub use crate::emotion::{EmotionAnalysis, EmotionInput, EmotionalIntelligence};
    pub use crate::profile::create_cognitive_emotional_profile;
    pub use crate::services::{connect_generator, list_available_services};
    pub use crate::telemetry::init_logging;
    pub use crate::tutor::{AiTutor, Quiz};
}
