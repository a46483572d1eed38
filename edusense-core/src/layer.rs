//! Layer trait and abstractions.
//!
//! Layers wrap a text generator with cross-cutting concerns such as logging
//! or retry. Each layer takes an inner generator and returns a new one.

use crate::error::EduError;
use crate::provider::{ServiceProvider, TextGenerator};
use crate::types::*;
use async_trait::async_trait;
use std::sync::Arc;

/// Layer trait for wrapping generators.
pub trait Layer<G: TextGenerator> {
    /// The type of the layered generator
    type LayeredGenerator: TextGenerator;

    /// Wrap the inner generator with this layer
    fn layer(&self, inner: G) -> Self::LayeredGenerator;
}

/// Helper trait for layered generators.
///
/// Provides forwarding defaults; implementers override only what they
/// intercept.
#[async_trait]
pub trait LayeredGenerator: Sized + TextGenerator {
    /// The inner generator type
    type Inner: TextGenerator;

    /// Get a reference to the inner generator
    fn inner(&self) -> &Self::Inner;

    /// Default implementation for info - forwards to inner
    fn layered_info(&self) -> Arc<ProviderInfo> {
        self.inner().info()
    }

    /// Default implementation for state - forwards to inner
    fn layered_state(&self) -> ProviderState {
        self.inner().state()
    }

    /// Default implementation for generate_text - forwards to inner
    async fn layered_generate_text(&self, req: TextRequest) -> Result<TextResult, EduError> {
        self.inner().generate_text(req).await
    }
}
