//! OpenAI-compatible generator using the async-openai crate.
//!
//! Works against any endpoint that speaks the chat completions protocol;
//! set `api_base` for compatible vendors.

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use edusense_core::error::EduError;
use edusense_core::provider::{ServiceProvider, TextGenerator};
use edusense_core::types::*;
use serde::Deserialize;
use std::sync::Arc;

/// Default chat model
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// OpenAI connection settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: String,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            model: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }
}

impl std::fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

/// OpenAI chat completions generator
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: Option<Client<OpenAIConfig>>,
    model: String,
    state: ProviderState,
    info: Arc<ProviderInfo>,
}

impl std::fmt::Debug for OpenAiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGenerator")
            .field("info", &self.info)
            .field("model", &self.model)
            .field("state", &self.state)
            .finish()
    }
}

impl OpenAiGenerator {
    /// Build from settings. A missing key yields an `Uninitialized` generator.
    pub fn new(settings: OpenAiSettings) -> Self {
        let mut builder = Self::builder().model(settings.model);
        if let Some(api_key) = settings.api_key.filter(|k| !k.trim().is_empty()) {
            builder = builder.api_key(api_key);
        }
        if let Some(api_base) = settings.api_base.filter(|b| !b.trim().is_empty()) {
            builder = builder.api_base(api_base);
        }
        builder.build()
    }

    /// Create a builder for more configuration options
    pub fn builder() -> OpenAiBuilder {
        OpenAiBuilder::default()
    }

    /// Model used for completions
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, req: &TextRequest) -> Result<CreateChatCompletionRequest, EduError> {
        let mut messages = Vec::with_capacity(2);

        if let Some(system) = &req.system {
            let msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(system.clone())
                .build()
                .map_err(|e| EduError::provider(format!("Failed to build system message: {}", e)))?;
            messages.push(ChatCompletionRequestMessage::System(msg));
        }

        let msg = ChatCompletionRequestUserMessageArgs::default()
            .content(req.prompt.clone())
            .build()
            .map_err(|e| EduError::provider(format!("Failed to build user message: {}", e)))?;
        messages.push(ChatCompletionRequestMessage::User(msg));

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(messages)
            .max_tokens(req.params.max_tokens);

        if let Some(temperature) = req.params.temperature {
            builder.temperature(temperature);
        }
        if let Some(top_p) = req.params.top_p {
            builder.top_p(top_p);
        }

        builder
            .build()
            .map_err(|e| EduError::provider(format!("Failed to build request: {}", e)))
    }
}

impl ServiceProvider for OpenAiGenerator {
    fn info(&self) -> Arc<ProviderInfo> {
        self.info.clone()
    }

    fn state(&self) -> ProviderState {
        self.state.clone()
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate_text(&self, req: TextRequest) -> Result<TextResult, EduError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| EduError::not_ready(format!("openai ({})", self.state.describe())))?;

        let openai_req = self.build_request(&req)?;

        let response = client
            .chat()
            .create(openai_req)
            .await
            .map_err(|e| EduError::provider(format!("OpenAI API error: {}", e)))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| EduError::provider("empty response from OpenAI"))?;

        Ok(TextResult {
            content,
            model: response.model,
        })
    }
}

/// Builder for the OpenAI generator
#[derive(Default)]
pub struct OpenAiBuilder {
    api_key: Option<String>,
    api_base: Option<String>,
    model: Option<String>,
}

impl OpenAiBuilder {
    /// Set API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set API base URL (for OpenAI-compatible APIs)
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set chat model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Build the generator
    pub fn build(self) -> OpenAiGenerator {
        let info = Arc::new(ProviderInfo::new(
            "openai",
            "OpenAI",
            "OpenAI-compatible chat completions",
        ));
        let model = self
            .model
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());

        let Some(api_key) = self.api_key else {
            return OpenAiGenerator {
                client: None,
                model,
                state: ProviderState::Uninitialized,
                info,
            };
        };

        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(api_base) = self.api_base {
            config = config.with_api_base(api_base);
        }

        OpenAiGenerator {
            client: Some(Client::with_config(config)),
            model,
            state: ProviderState::Ready,
            info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_uninitialized() {
        let generator = OpenAiGenerator::new(OpenAiSettings::default());
        assert_eq!(generator.state(), ProviderState::Uninitialized);
        assert_eq!(generator.model(), DEFAULT_OPENAI_MODEL);
    }

    #[test]
    fn test_builder_with_key_is_ready() {
        let generator = OpenAiGenerator::builder()
            .api_key("sk-test")
            .api_base("http://localhost:1234/v1")
            .model("gpt-test")
            .build();
        assert!(generator.state().is_ready());
        assert_eq!(generator.id(), "openai");
    }

    #[test]
    fn test_build_request_includes_system() {
        let generator = OpenAiGenerator::builder().api_key("sk-test").build();
        let req = TextRequest::new("hi").with_system("be terse");
        let built = generator.build_request(&req).unwrap();
        assert_eq!(built.messages.len(), 2);
        assert_eq!(built.model, DEFAULT_OPENAI_MODEL);
    }
}
