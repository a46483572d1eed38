//! Logging layer for generator calls.
//!
//! Emits structured `tracing` events per call. The reply preview is logged at
//! `trace` so unparsable model output can be inspected without dumping full
//! responses at `debug`.

use async_trait::async_trait;
use edusense_core::error::EduError;
use edusense_core::layer::{Layer, LayeredGenerator};
use edusense_core::provider::{ServiceProvider, TextGenerator};
use edusense_core::types::*;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct LoggingLayer {
    preview_chars: usize,
}

impl LoggingLayer {
    pub fn new() -> Self {
        Self { preview_chars: 120 }
    }

    /// Characters of each reply included in the trace preview
    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }
}

impl Default for LoggingLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: TextGenerator> Layer<G> for LoggingLayer {
    type LayeredGenerator = LoggingGenerator<G>;

    fn layer(&self, inner: G) -> Self::LayeredGenerator {
        LoggingGenerator {
            inner,
            preview_chars: self.preview_chars,
        }
    }
}

/// Generator wrapped with logging
#[derive(Debug)]
pub struct LoggingGenerator<G> {
    inner: G,
    preview_chars: usize,
}

/// Leading `max_chars` characters of `text`, never splitting a character
fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[async_trait]
impl<G: TextGenerator> LayeredGenerator for LoggingGenerator<G> {
    type Inner = G;

    fn inner(&self) -> &Self::Inner {
        &self.inner
    }

    async fn layered_generate_text(&self, req: TextRequest) -> Result<TextResult, EduError> {
        let generator = self.inner.info().id.clone();
        tracing::debug!(
            generator = %generator,
            prompt_chars = req.prompt.chars().count(),
            json_mode = req.json_mode,
            has_system = req.system.is_some(),
            "generation started"
        );

        let start = Instant::now();
        let result = self.inner.generate_text(req).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(reply) => {
                tracing::debug!(
                    generator = %generator,
                    model = %reply.model,
                    reply_chars = reply.content.chars().count(),
                    elapsed_ms,
                    "generation finished"
                );
                tracing::trace!(
                    generator = %generator,
                    reply = preview(&reply.content, self.preview_chars),
                    "reply preview"
                );
            }
            Err(e) => {
                tracing::warn!(
                    generator = %generator,
                    error = %e,
                    retryable = e.is_retryable(),
                    elapsed_ms,
                    "generation failed"
                );
            }
        }

        result
    }
}

impl<G: TextGenerator> ServiceProvider for LoggingGenerator<G> {
    fn info(&self) -> Arc<ProviderInfo> {
        LayeredGenerator::layered_info(self)
    }

    fn state(&self) -> ProviderState {
        LayeredGenerator::layered_state(self)
    }
}

#[async_trait]
impl<G: TextGenerator> TextGenerator for LoggingGenerator<G> {
    async fn generate_text(&self, req: TextRequest) -> Result<TextResult, EduError> {
        LayeredGenerator::layered_generate_text(self, req).await
    }
}
