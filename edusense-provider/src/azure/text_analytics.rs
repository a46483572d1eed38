//! Azure Text Analytics sentiment client.

use super::{connect, AzureConnection, AzureCredentials, SUBSCRIPTION_KEY_HEADER};
use crate::http::{check_status, map_send_error};
use async_trait::async_trait;
use edusense_core::error::EduError;
use edusense_core::provider::{SentimentAnalyzer, ServiceProvider};
use edusense_core::types::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Text analytics client. Sends one document per call.
pub struct TextAnalyticsClient {
    connection: Option<AzureConnection>,
    language: String,
    state: ProviderState,
    info: Arc<ProviderInfo>,
}

impl std::fmt::Debug for TextAnalyticsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextAnalyticsClient")
            .field("state", &self.state)
            .field("language", &self.language)
            .finish()
    }
}

impl TextAnalyticsClient {
    pub fn new(credentials: &AzureCredentials, timeout: Duration) -> Self {
        let (connection, state) = connect("text_analytics", credentials, timeout);
        Self {
            connection,
            language: "en".to_string(),
            state,
            info: Arc::new(ProviderInfo::new(
                "azure_text_analytics",
                "Azure Text Analytics",
                "Azure AI Language sentiment analysis",
            )),
        }
    }

    /// Set the document language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl ServiceProvider for TextAnalyticsClient {
    fn info(&self) -> Arc<ProviderInfo> {
        self.info.clone()
    }

    fn state(&self) -> ProviderState {
        self.state.clone()
    }
}

#[async_trait]
impl SentimentAnalyzer for TextAnalyticsClient {
    async fn analyze_sentiment(&self, text: &str) -> Result<DocumentSentiment, EduError> {
        let connection = self.connection.as_ref().ok_or_else(|| {
            EduError::not_ready(format!("azure_text_analytics ({})", self.state.describe()))
        })?;

        let body = SentimentRequest {
            documents: vec![InputDocument {
                id: "1",
                language: &self.language,
                text,
            }],
        };

        let response = connection
            .http
            .post(format!("{}/text/analytics/v3.1/sentiment", connection.endpoint))
            .header(SUBSCRIPTION_KEY_HEADER, &connection.key)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let response: SentimentResponse = check_status(response).await?.json().await?;

        if let Some(document) = response.documents.into_iter().next() {
            return Ok(document);
        }

        let reason = response
            .errors
            .into_iter()
            .next()
            .map(|e| e.error.message)
            .unwrap_or_else(|| "no documents in response".to_string());
        Err(EduError::provider(reason))
    }
}

#[derive(Serialize)]
struct SentimentRequest<'a> {
    documents: Vec<InputDocument<'a>>,
}

#[derive(Serialize)]
struct InputDocument<'a> {
    id: &'a str,
    language: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct SentimentResponse {
    #[serde(default)]
    documents: Vec<DocumentSentiment>,
    #[serde(default)]
    errors: Vec<DocumentError>,
}

#[derive(Deserialize)]
struct DocumentError {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}
