//! Google Gemini provider over the `generateContent` REST API.
//!
//! At connect time the provider lists the models visible to the key and
//! picks the preferred one, or the first available fallback. Without an API
//! key the generator is constructed in the `Uninitialized` state and every
//! call fails fast.

use crate::http::{build_client, check_status, map_send_error, DEFAULT_TIMEOUT};
use async_trait::async_trait;
use edusense_core::error::EduError;
use edusense_core::provider::{ServiceProvider, TextGenerator};
use edusense_core::types::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Public Gemini endpoint
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when the account exposes it
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Models tried in order when the preferred one is unavailable
pub const GEMINI_FALLBACK_MODELS: [&str; 5] = [
    "gemini-2.0-flash",
    "gemini-1.0-pro",
    "gemini-1.5-flash",
    "gemini-1.0-flash",
    "gemini-1.5-pro",
];

/// Gemini connection settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub fallback_models: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            fallback_models: GEMINI_FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl GeminiConfig {
    /// Config with an API key and default model preferences
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the preferred model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("fallback_models", &self.fallback_models)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

struct Connection {
    http: reqwest::Client,
    api_key: String,
}

/// Gemini text generator
pub struct GeminiGenerator {
    connection: Option<Connection>,
    base_url: String,
    model: String,
    state: ProviderState,
    info: Arc<ProviderInfo>,
}

impl std::fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("state", &self.state)
            .finish()
    }
}

impl GeminiGenerator {
    /// Build the generator without model discovery
    pub fn new(config: GeminiConfig) -> Self {
        let info = Arc::new(ProviderInfo::new(
            "gemini",
            "Google Gemini",
            "Google's Gemini 2.0 Flash model (with fallback options)",
        ));
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let api_key = config.api_key.filter(|key| !key.trim().is_empty());
        let (connection, state) = match api_key {
            None => (None, ProviderState::Uninitialized),
            Some(api_key) => match build_client(Duration::from_secs(config.timeout_secs)) {
                Ok(http) => (Some(Connection { http, api_key }), ProviderState::Ready),
                Err(e) => (None, ProviderState::Failed(e.to_string())),
            },
        };

        Self {
            connection,
            base_url,
            model: config.model,
            state,
            info,
        }
    }

    /// Build the generator and select a model the account can use.
    ///
    /// A failed model listing keeps the preferred model; the provider stays
    /// `Ready` and errors surface on the first generation call instead.
    pub async fn connect(config: GeminiConfig) -> Self {
        let fallbacks = config.fallback_models.clone();
        let mut generator = Self::new(config);
        if !generator.state.is_ready() {
            tracing::debug!(
                state = %generator.state.describe(),
                "Gemini generator not initialized"
            );
            return generator;
        }

        match generator.list_models().await {
            Ok(available) if !available.is_empty() => {
                generator.model = select_model(&generator.model, &fallbacks, &available);
            }
            Ok(_) => tracing::warn!("No available Gemini models found"),
            Err(e) => tracing::warn!(error = %e, "Could not list Gemini models"),
        }

        tracing::info!(model = %generator.model, "Gemini service initialized");
        generator
    }

    /// Model used for generation
    pub fn model(&self) -> &str {
        &self.model
    }

    fn connection(&self) -> Result<&Connection, EduError> {
        self.connection
            .as_ref()
            .ok_or_else(|| EduError::not_ready(format!("gemini ({})", self.state.describe())))
    }

    /// Names of the Gemini models that support `generateContent`
    pub async fn list_models(&self) -> Result<Vec<String>, EduError> {
        let connection = self.connection()?;
        let response = connection
            .http
            .get(format!("{}/models", self.base_url))
            .header("x-goog-api-key", &connection.api_key)
            .query(&[("pageSize", "1000")])
            .send()
            .await
            .map_err(map_send_error)?;

        let listing: ModelList = check_status(response).await?.json().await?;

        Ok(listing
            .models
            .into_iter()
            .filter(|m| {
                m.name.contains("gemini")
                    && m.supported_generation_methods
                        .iter()
                        .any(|method| method == "generateContent")
            })
            .map(|m| m.name.trim_start_matches("models/").to_string())
            .collect())
    }
}

/// Keep `preferred` if available, else the first available fallback, else
/// `preferred` unchanged.
pub fn select_model(preferred: &str, fallbacks: &[String], available: &[String]) -> String {
    if available.iter().any(|m| m == preferred) {
        return preferred.to_string();
    }

    match fallbacks.iter().find(|m| available.contains(m)) {
        Some(model) => {
            tracing::info!(preferred, selected = %model, "Preferred Gemini model unavailable");
            model.clone()
        }
        None => preferred.to_string(),
    }
}

impl ServiceProvider for GeminiGenerator {
    fn info(&self) -> Arc<ProviderInfo> {
        self.info.clone()
    }

    fn state(&self) -> ProviderState {
        self.state.clone()
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate_text(&self, req: TextRequest) -> Result<TextResult, EduError> {
        let connection = self.connection()?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &req.prompt }],
            }],
            system_instruction: req.system.as_deref().map(|text| Content {
                role: None,
                parts: vec![Part { text }],
            }),
            generation_config: GenerationConfig {
                max_output_tokens: req.params.max_tokens,
                temperature: req.params.temperature,
                top_p: req.params.top_p,
                top_k: req.params.top_k,
            },
        };

        let response = connection
            .http
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
            .header("x-goog-api-key", &connection.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let response: GenerateContentResponse = check_status(response).await?.json().await?;

        let content = response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default();

        if content.trim().is_empty() {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("prompt blocked: {r}"))
                .unwrap_or_else(|| "empty response from Gemini".to_string());
            return Err(EduError::provider(reason));
        }

        Ok(TextResult {
            content,
            model: response.model_version.unwrap_or_else(|| self.model.clone()),
        })
    }
}

// Wire types

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelEntry {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}
