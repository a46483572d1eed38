//! GenerationRuntime implementation.
//!
//! This module implements the GenerationRuntime, which provides
//! `generate_text()` and `generate_structured()` on top of a layered
//! [`TextGenerator`] with a JSON output strategy.

use crate::error::EduError;
use crate::layer::Layer;
use crate::normalize::ResponseSchema;
use crate::provider::{SharedGenerator, TextGenerator};
use crate::strategy::{detect_json_strategy, JsonOutputStrategy};
use crate::types::*;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Builder for composing a generator with layers.
///
/// # Example
///
/// ```ignore
/// let runtime = GenerationRuntime::builder(gemini)
///     .layer(LoggingLayer::new())
///     .layer(RetryLayer::new())
///     .finish();
/// ```
pub struct GenerationRuntimeBuilder<G> {
    generator: G,
    json_strategy: Option<Box<dyn JsonOutputStrategy>>,
}

impl<G: TextGenerator> GenerationRuntimeBuilder<G> {
    /// Create a new builder with a generator
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            json_strategy: None,
        }
    }

    /// Add a layer to wrap the generator
    ///
    /// Each call creates a new concrete type by wrapping the previous
    /// generator.
    pub fn layer<L>(self, layer: L) -> GenerationRuntimeBuilder<L::LayeredGenerator>
    where
        L: Layer<G>,
    {
        GenerationRuntimeBuilder {
            generator: layer.layer(self.generator),
            json_strategy: self.json_strategy,
        }
    }

    /// Set a custom JSON output strategy
    ///
    /// If not set, the strategy is detected from the generator id.
    pub fn json_strategy(mut self, strategy: Box<dyn JsonOutputStrategy>) -> Self {
        self.json_strategy = Some(strategy);
        self
    }

    /// Finish building and create a GenerationRuntime
    pub fn finish(self) -> GenerationRuntime {
        let generator: SharedGenerator = Arc::new(self.generator);
        let json_strategy = self
            .json_strategy
            .unwrap_or_else(|| detect_json_strategy(&generator.info().id));

        GenerationRuntime {
            generator,
            json_strategy,
        }
    }
}

/// A generator plus the policy for asking it for JSON.
pub struct GenerationRuntime {
    generator: SharedGenerator,
    json_strategy: Box<dyn JsonOutputStrategy>,
}

impl std::fmt::Debug for GenerationRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationRuntime")
            .field("generator", &self.generator)
            .field("json_strategy", &self.json_strategy.name())
            .finish()
    }
}

impl GenerationRuntime {
    /// Create a new builder
    pub fn builder<G: TextGenerator>(generator: G) -> GenerationRuntimeBuilder<G> {
        GenerationRuntimeBuilder::new(generator)
    }

    /// Get generator information
    pub fn info(&self) -> Arc<ProviderInfo> {
        self.generator.info()
    }

    /// Generator id
    pub fn id(&self) -> String {
        self.generator.info().id.clone()
    }

    /// Current generator state
    pub fn state(&self) -> ProviderState {
        self.generator.state()
    }

    /// Shared handle to the underlying generator
    pub fn generator(&self) -> SharedGenerator {
        self.generator.clone()
    }

    /// Generate free text for a prompt
    pub async fn generate_text(&self, prompt: impl Into<String>) -> Result<TextResult, EduError> {
        self.generate(TextRequest::new(prompt)).await
    }

    /// Generate text for a prepared request
    pub async fn generate(&self, req: TextRequest) -> Result<TextResult, EduError> {
        let state = self.generator.state();
        if !state.is_ready() {
            return Err(EduError::not_ready(format!(
                "{} ({})",
                self.id(),
                state.describe()
            )));
        }
        self.generator.generate_text(req).await
    }

    /// Ask for JSON and normalize the answer against `schema`.
    ///
    /// Returns the raw text alongside the error so callers can fall back to
    /// their own parsing of the same response.
    pub async fn generate_value(
        &self,
        prompt: impl Into<String>,
        schema: &ResponseSchema,
    ) -> Result<serde_json::Value, StructuredError> {
        let mut req = TextRequest::new(prompt);
        self.json_strategy
            .apply(&mut req)
            .map_err(StructuredError::generation)?;

        let result = self.generate(req).await.map_err(StructuredError::generation)?;

        schema
            .normalize_text(&result.content)
            .map_err(|error| StructuredError::Normalization {
                error,
                raw: result.content,
            })
    }

    /// Ask for JSON, normalize it and deserialize into `T`.
    pub async fn generate_structured<T: DeserializeOwned>(
        &self,
        prompt: impl Into<String>,
        schema: &ResponseSchema,
    ) -> Result<T, StructuredError> {
        let value = self.generate_value(prompt, schema).await?;
        serde_json::from_value(value).map_err(|e| StructuredError::Normalization {
            error: e.into(),
            raw: String::new(),
        })
    }
}

/// Failure of a structured generation call
#[derive(Debug, thiserror::Error)]
pub enum StructuredError {
    /// The backend could not produce text
    #[error(transparent)]
    Generation(EduError),

    /// Text was produced but did not conform to the schema
    #[error("{error}")]
    Normalization { error: EduError, raw: String },
}

impl StructuredError {
    fn generation(error: EduError) -> Self {
        Self::Generation(error)
    }

    /// The raw text, when the backend answered at all
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            StructuredError::Normalization { raw, .. } if !raw.is_empty() => Some(raw),
            _ => None,
        }
    }
}

impl From<StructuredError> for EduError {
    fn from(err: StructuredError) -> Self {
        match err {
            StructuredError::Generation(e) | StructuredError::Normalization { error: e, .. } => e,
        }
    }
}
