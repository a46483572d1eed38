//! Registry of text generation services.
//!
//! [`connect_generator`] never fails: an unknown name or a backend that is not
//! `Ready` falls back to the mock generator.

use crate::config::AppConfig;
use edusense_core::{
    GenerationRuntime, ProviderInfo, ProviderState, ServiceProvider, TextGenerator,
};
use edusense_layer::{LoggingLayer, RetryLayer};
use edusense_provider::{GeminiGenerator, MockGenerator, OpenAiGenerator};
use serde::Serialize;
use std::time::Duration;

/// A selectable generation service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Whether credentials for the service are present
    pub configured: bool,
}

impl ServiceDescriptor {
    fn new(info: ProviderInfo, configured: bool) -> Self {
        Self {
            id: info.id,
            name: info.name,
            description: info.description,
            configured,
        }
    }
}

/// Services the tutor can switch between, in display order
pub fn list_available_services(config: &AppConfig) -> Vec<ServiceDescriptor> {
    let gemini = GeminiGenerator::new(config.gemini.clone());
    let openai = OpenAiGenerator::new(config.openai.clone());
    let mock = MockGenerator::new();

    vec![
        ServiceDescriptor::new(gemini.info().as_ref().clone(), gemini.state().is_ready()),
        ServiceDescriptor::new(mock.info().as_ref().clone(), true),
        ServiceDescriptor::new(openai.info().as_ref().clone(), openai.state().is_ready()),
    ]
}

/// Connect the named service, wrapped with retry and logging layers.
pub async fn connect_generator(name: &str, config: &AppConfig) -> GenerationRuntime {
    match name.trim().to_lowercase().as_str() {
        "gemini" => {
            let gemini = GeminiGenerator::connect(config.gemini.clone()).await;
            ready_or_mock(gemini, config)
        }
        "openai" => ready_or_mock(OpenAiGenerator::new(config.openai.clone()), config),
        "mock" => layered(MockGenerator::new(), config),
        other => {
            tracing::warn!(
                service = other,
                "LLM service not supported, falling back to mock service"
            );
            layered(MockGenerator::new(), config)
        }
    }
}

fn ready_or_mock<G: TextGenerator>(generator: G, config: &AppConfig) -> GenerationRuntime {
    match generator.state() {
        ProviderState::Ready => layered(generator, config),
        state => {
            tracing::warn!(
                service = %generator.id(),
                state = %state.describe(),
                "LLM service not ready, falling back to mock service"
            );
            layered(MockGenerator::new(), config)
        }
    }
}

/// Compose a generator with the configured layers
pub fn layered<G: TextGenerator>(generator: G, config: &AppConfig) -> GenerationRuntime {
    GenerationRuntime::builder(generator)
        .layer(
            RetryLayer::new()
                .with_max_retries(config.retry.max_retries)
                .with_initial_delay(Duration::from_millis(config.retry.initial_delay_ms)),
        )
        .layer(LoggingLayer::new())
        .finish()
}
