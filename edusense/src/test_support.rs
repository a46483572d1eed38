//! Scripted providers shared by the service tests.

use async_trait::async_trait;
use edusense_core::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Generator that replays one canned answer and counts calls
#[derive(Debug)]
pub struct ScriptedGenerator {
    info: Arc<ProviderInfo>,
    state: ProviderState,
    reply: std::result::Result<String, String>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedGenerator {
    pub fn replying(id: &str, text: &str) -> Self {
        Self {
            info: Arc::new(ProviderInfo::new(id, id, "scripted")),
            state: ProviderState::Ready,
            reply: Ok(text.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(id: &str, reason: &str) -> Self {
        Self {
            reply: Err(reason.to_string()),
            ..Self::replying(id, "")
        }
    }

    pub fn with_state(mut self, state: ProviderState) -> Self {
        self.state = state;
        self
    }

    /// Handle that keeps counting after the generator is moved into a runtime
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub fn runtime(self) -> GenerationRuntime {
        GenerationRuntime::builder(self).finish()
    }
}

impl ServiceProvider for ScriptedGenerator {
    fn info(&self) -> Arc<ProviderInfo> {
        self.info.clone()
    }

    fn state(&self) -> ProviderState {
        self.state.clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate_text(&self, _req: TextRequest) -> Result<TextResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(TextResult {
                content: text.clone(),
                model: "scripted-1".to_string(),
            }),
            Err(reason) => Err(EduError::provider(reason.clone())),
        }
    }
}

/// Sentiment service with a fixed answer
#[derive(Debug)]
pub struct FixedSentiment {
    pub state: ProviderState,
    pub reply: Option<DocumentSentiment>,
}

impl FixedSentiment {
    pub fn disabled() -> Self {
        Self {
            state: ProviderState::Uninitialized,
            reply: None,
        }
    }

    pub fn answering(sentiment: &str, scores: ConfidenceScores) -> Self {
        Self {
            state: ProviderState::Ready,
            reply: Some(DocumentSentiment {
                sentiment: sentiment.to_string(),
                confidence_scores: scores,
            }),
        }
    }
}

impl ServiceProvider for FixedSentiment {
    fn info(&self) -> Arc<ProviderInfo> {
        Arc::new(ProviderInfo::new(
            "azure_text_analytics",
            "Fixed sentiment",
            "scripted",
        ))
    }

    fn state(&self) -> ProviderState {
        self.state.clone()
    }
}

#[async_trait]
impl SentimentAnalyzer for FixedSentiment {
    async fn analyze_sentiment(&self, _text: &str) -> Result<DocumentSentiment> {
        self.reply
            .clone()
            .ok_or_else(|| EduError::provider("service unavailable"))
    }
}

/// Face detector with a fixed answer
#[derive(Debug)]
pub struct FixedFaces {
    pub state: ProviderState,
    pub reply: Option<Vec<DetectedFace>>,
}

impl FixedFaces {
    pub fn disabled() -> Self {
        Self {
            state: ProviderState::Uninitialized,
            reply: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            state: ProviderState::Ready,
            reply: None,
        }
    }

    pub fn answering(faces: Vec<DetectedFace>) -> Self {
        Self {
            state: ProviderState::Ready,
            reply: Some(faces),
        }
    }
}

impl ServiceProvider for FixedFaces {
    fn info(&self) -> Arc<ProviderInfo> {
        Arc::new(ProviderInfo::new("azure_face", "Fixed faces", "scripted"))
    }

    fn state(&self) -> ProviderState {
        self.state.clone()
    }
}

#[async_trait]
impl FaceDetector for FixedFaces {
    async fn detect_faces(&self, _image: &[u8]) -> Result<Vec<DetectedFace>> {
        self.reply
            .clone()
            .ok_or_else(|| EduError::timeout("face service timed out"))
    }
}

/// Ranker with a fixed answer
#[derive(Debug)]
pub struct FixedRanker {
    pub state: ProviderState,
    pub reply: Option<String>,
}

impl ServiceProvider for FixedRanker {
    fn info(&self) -> Arc<ProviderInfo> {
        Arc::new(ProviderInfo::new("azure_personalizer", "Fixed ranker", "scripted"))
    }

    fn state(&self) -> ProviderState {
        self.state.clone()
    }
}

#[async_trait]
impl ContentRanker for FixedRanker {
    async fn rank(&self, _req: RankRequest) -> Result<RankResponse> {
        self.reply
            .clone()
            .map(|id| RankResponse {
                reward_action_id: id,
                event_id: None,
            })
            .ok_or_else(|| EduError::provider("rank failed"))
    }
}

/// Smallest byte sequence recognized as a PNG
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52,
];
