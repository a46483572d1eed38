//! # edusense core
//!
//! Core abstractions for the edusense learning assistant.
//!
//! This crate provides the provider traits, the response normalizer that
//! pulls schema-conformant JSON out of free-form model output, and the
//! fallback chains that guarantee every request ends in a usable value.

pub mod error;
pub mod layer;
pub mod normalize;
pub mod provider;
pub mod runtime;
pub mod strategy;
pub mod types;

// Re-exports
pub use error::EduError;
pub use layer::{Layer, LayeredGenerator};
pub use normalize::{FieldPolicy, FieldSpec, ResponseSchema, Shape};
pub use provider::{
    ContentRanker, FaceDetector, SentimentAnalyzer, ServiceProvider, SharedGenerator,
    TextGenerator,
};
pub use runtime::{
    ChainReport, FallbackChain, GenerationRuntime, Normalized, ProviderOutcome, StructuredError,
};
pub use strategy::{JsonOutputStrategy, PromptOnlyStrategy, SystemInstructionStrategy};
pub use types::*;

/// Result type alias for edusense operations
pub type Result<T> = std::result::Result<T, EduError>;
