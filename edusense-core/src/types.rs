//! Core types shared by providers and services.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Identity used for the synthetic result of an exhausted fallback chain.
pub const PLACEHOLDER_PROVIDER: &str = "placeholder";

/// Provider information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl ProviderInfo {
    /// Create provider information
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Lifecycle state every provider reports through [`crate::ServiceProvider::state`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ProviderState {
    /// No credentials were supplied; the provider was never constructed.
    Uninitialized,
    /// The provider can serve requests.
    Ready,
    /// Construction was attempted and failed.
    Failed(String),
}

impl ProviderState {
    /// Whether requests may be sent to the provider
    pub fn is_ready(&self) -> bool {
        matches!(self, ProviderState::Ready)
    }

    /// Human readable reason for a provider being skipped
    pub fn describe(&self) -> String {
        match self {
            ProviderState::Uninitialized => "not configured".to_string(),
            ProviderState::Ready => "ready".to_string(),
            ProviderState::Failed(reason) => format!("failed to initialize: {reason}"),
        }
    }
}

/// Sampling parameters for a text generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Maximum number of tokens to generate
    pub max_tokens: u32,

    /// Temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Top-p sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Top-k sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    /// Additional provider-specific parameters
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: Some(0.1),
            top_p: Some(0.95),
            top_k: Some(40),
            extra: HashMap::new(),
        }
    }
}

impl GenerationParams {
    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set top-p
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// A prompt sent to a generative backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRequest {
    pub prompt: String,
    pub params: GenerationParams,
    /// System instruction, set by a JSON output strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Whether the backend should favour deterministic structured output
    pub json_mode: bool,
}

impl TextRequest {
    /// Create a request with default generation parameters
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            params: GenerationParams::default(),
            system: None,
            json_mode: false,
        }
    }

    /// Set generation parameters
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Set a system instruction
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Heuristic: the prompt mentions JSON or contains an object literal.
    pub fn wants_json(&self) -> bool {
        self.prompt.to_lowercase().contains("json") || self.prompt.contains('{')
    }
}

/// Text returned by a generative backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextResult {
    pub content: String,
    pub model: String,
}

/// Per-request context used to correlate log lines of one chain resolution
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub operation: String,
    pub metadata: Arc<HashMap<String, String>>,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            operation: operation.into(),
            metadata: Arc::new(HashMap::new()),
        }
    }

    /// Create context with metadata
    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Arc::new(metadata);
        self
    }
}

// ============================================================================
// Cloud service payloads
// ============================================================================

/// Positive / neutral / negative confidence scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceScores {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl ConfidenceScores {
    /// Create scores
    pub fn new(positive: f64, neutral: f64, negative: f64) -> Self {
        Self {
            positive,
            neutral,
            negative,
        }
    }

    /// Sum of the three categories
    pub fn total(&self) -> f64 {
        self.positive + self.neutral + self.negative
    }

    /// Label of the highest category, earliest wins on ties
    pub fn dominant(&self) -> &'static str {
        let mut best = ("positive", self.positive);
        for candidate in [("neutral", self.neutral), ("negative", self.negative)] {
            if candidate.1 > best.1 {
                best = candidate;
            }
        }
        best.0
    }

    /// Copy of the scores scaled to sum to 1.0. Returns the scores unchanged
    /// when the total is zero.
    pub fn renormalized(&self) -> Self {
        let total = self.total();
        if total <= 0.0 {
            return *self;
        }
        Self::new(
            self.positive / total,
            self.neutral / total,
            self.negative / total,
        )
    }
}

/// Document-level sentiment returned by a text analytics service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSentiment {
    pub sentiment: String,
    pub confidence_scores: ConfidenceScores,
}

/// Per-face emotion scores. Missing categories read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceEmotions {
    pub anger: f64,
    pub contempt: f64,
    pub disgust: f64,
    pub fear: f64,
    pub happiness: f64,
    pub neutral: f64,
    pub sadness: f64,
    pub surprise: f64,
}

impl FaceEmotions {
    /// Category names, in the order used for tie-breaking.
    pub const CATEGORIES: [&'static str; 8] = [
        "anger",
        "contempt",
        "disgust",
        "fear",
        "happiness",
        "neutral",
        "sadness",
        "surprise",
    ];

    /// A distribution with all weight on `neutral`
    pub fn all_neutral() -> Self {
        Self {
            neutral: 1.0,
            ..Self::default()
        }
    }

    /// Category name and score pairs
    pub fn scores(&self) -> [(&'static str, f64); 8] {
        [
            ("anger", self.anger),
            ("contempt", self.contempt),
            ("disgust", self.disgust),
            ("fear", self.fear),
            ("happiness", self.happiness),
            ("neutral", self.neutral),
            ("sadness", self.sadness),
            ("surprise", self.surprise),
        ]
    }

    /// Name of the strongest emotion, earliest category wins on ties
    pub fn dominant(&self) -> &'static str {
        let scores = self.scores();
        let mut best = scores[0];
        for candidate in scores.into_iter().skip(1) {
            if candidate.1 > best.1 {
                best = candidate;
            }
        }
        best.0
    }

    /// Collapse the emotions into positive / neutral / negative
    pub fn to_sentiment(&self) -> ConfidenceScores {
        ConfidenceScores {
            positive: self.happiness + self.surprise,
            neutral: self.neutral,
            negative: self.sadness + self.anger + self.fear + self.contempt + self.disgust,
        }
    }
}

/// A face found by a face detection service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedFace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_id: Option<String>,
    pub emotion: FaceEmotions,
}

/// An item a ranking service may choose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankableAction {
    pub id: String,
    pub features: Vec<serde_json::Value>,
}

/// Ranking request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankRequest {
    pub context_features: Vec<serde_json::Value>,
    pub actions: Vec<RankableAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

/// Ranking response; only the chosen action is used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankResponse {
    pub reward_action_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}
