//! Provider traits and core abstractions.
//!
//! Every remote capability (text generation, sentiment analysis, face
//! detection, ranking) is a [`ServiceProvider`]: it identifies itself and
//! reports an explicit [`ProviderState`]. Fallback chains consult the state
//! before calling a provider instead of probing for ad-hoc flags.

use crate::error::EduError;
use crate::types::*;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Shared generator handle
pub type SharedGenerator = Arc<dyn TextGenerator>;

/// Identity and lifecycle state common to every provider.
pub trait ServiceProvider: Send + Sync + Debug + 'static {
    /// Get provider information
    fn info(&self) -> Arc<ProviderInfo>;

    /// Current lifecycle state
    fn state(&self) -> ProviderState {
        ProviderState::Ready
    }

    /// Provider id, shorthand for `info().id`
    fn id(&self) -> String {
        self.info().id.clone()
    }
}

/// A generative text backend: given a prompt, returns text, fallibly.
#[async_trait]
pub trait TextGenerator: ServiceProvider {
    /// Generate text for a single prompt
    async fn generate_text(&self, req: TextRequest) -> Result<TextResult, EduError>;
}

/// A document sentiment service.
#[async_trait]
pub trait SentimentAnalyzer: ServiceProvider {
    /// Analyze one document
    async fn analyze_sentiment(&self, text: &str) -> Result<DocumentSentiment, EduError>;
}

/// A face detection service that reports emotion attributes.
#[async_trait]
pub trait FaceDetector: ServiceProvider {
    /// Detect faces in raw image bytes
    async fn detect_faces(&self, image: &[u8]) -> Result<Vec<DetectedFace>, EduError>;
}

/// A content ranking service.
#[async_trait]
pub trait ContentRanker: ServiceProvider {
    /// Pick the best action for a context
    async fn rank(&self, req: RankRequest) -> Result<RankResponse, EduError>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate_text(&self, req: TextRequest) -> Result<TextResult, EduError> {
        (**self).generate_text(req).await
    }
}

impl<T: ServiceProvider + ?Sized> ServiceProvider for Arc<T> {
    fn info(&self) -> Arc<ProviderInfo> {
        (**self).info()
    }

    fn state(&self) -> ProviderState {
        (**self).state()
    }
}
