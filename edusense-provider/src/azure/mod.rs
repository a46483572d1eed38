//! Azure cognitive service clients.
//!
//! Each client is built from an [`AzureCredentials`] pair. A missing endpoint
//! or key leaves the client `Uninitialized`; the chains skip it.

pub mod chat;
pub mod face;
pub mod personalizer;
pub mod text_analytics;

pub use chat::ExpertChatClient;
pub use face::FaceClient;
pub use personalizer::PersonalizerClient;
pub use text_analytics::TextAnalyticsClient;

use crate::http::{build_client, trim_endpoint};
use edusense_core::types::ProviderState;
use serde::Deserialize;
use std::time::Duration;

/// Header carrying the subscription key on every Azure call
pub(crate) const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Endpoint and key for one Azure resource. Blank values count as absent.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AzureCredentials {
    pub endpoint: Option<String>,
    pub key: Option<String>,
}

impl AzureCredentials {
    /// Credentials from an endpoint and key
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            key: Some(key.into()),
        }
    }

    /// Endpoint without trailing slash and key, when both are set
    pub fn resolve(&self) -> Option<(String, String)> {
        let endpoint = self.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty())?;
        let key = self.key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
        Some((trim_endpoint(endpoint), key.to_string()))
    }

    /// Whether both values are present
    pub fn is_configured(&self) -> bool {
        self.resolve().is_some()
    }
}

impl std::fmt::Debug for AzureCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureCredentials")
            .field("endpoint", &self.endpoint)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Resolved connection to an Azure resource
pub(crate) struct AzureConnection {
    pub http: reqwest::Client,
    pub endpoint: String,
    pub key: String,
}

/// Build a connection and the matching lifecycle state
pub(crate) fn connect(
    service: &str,
    credentials: &AzureCredentials,
    timeout: Duration,
) -> (Option<AzureConnection>, ProviderState) {
    let Some((endpoint, key)) = credentials.resolve() else {
        tracing::debug!(service, "Azure credentials not configured");
        return (None, ProviderState::Uninitialized);
    };

    match build_client(timeout) {
        Ok(http) => {
            tracing::info!(service, endpoint = %endpoint, "Azure client initialized");
            (
                Some(AzureConnection {
                    http,
                    endpoint,
                    key,
                }),
                ProviderState::Ready,
            )
        }
        Err(e) => {
            tracing::error!(service, error = %e, "Failed to initialize Azure client");
            (None, ProviderState::Failed(e.to_string()))
        }
    }
}
