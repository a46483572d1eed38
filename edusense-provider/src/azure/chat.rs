//! Expert chat over Azure Communication Services.
//!
//! The client validates the access token at construction; a token that is
//! not a three-segment JWT leaves the client `Failed`. Replies are produced
//! locally and echo the learner's message.

use super::AzureCredentials;
use crate::http::trim_endpoint;
use edusense_core::error::EduError;
use edusense_core::provider::ServiceProvider;
use edusense_core::types::*;
use std::sync::Arc;

pub struct ExpertChatClient {
    endpoint: Option<String>,
    state: ProviderState,
    info: Arc<ProviderInfo>,
}

impl std::fmt::Debug for ExpertChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpertChatClient")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state)
            .finish()
    }
}

impl ExpertChatClient {
    /// Build from the communication endpoint and access token
    pub fn new(credentials: &AzureCredentials) -> Self {
        let info = Arc::new(ProviderInfo::new(
            "azure_communication",
            "Azure Communication Services",
            "Expert chat over Azure Communication Services",
        ));

        let Some((endpoint, token)) = credentials.resolve() else {
            return Self {
                endpoint: None,
                state: ProviderState::Uninitialized,
                info,
            };
        };

        let state = if is_valid_token(&token) {
            tracing::info!(endpoint = %endpoint, "Chat client initialized");
            ProviderState::Ready
        } else {
            tracing::error!("Invalid Communication Services access token format");
            ProviderState::Failed("invalid access token format".to_string())
        };

        Self {
            endpoint: Some(trim_endpoint(&endpoint)),
            state,
            info,
        }
    }

    /// Reply to a learner's message
    pub fn reply(&self, message: &str) -> Result<String, EduError> {
        if !self.state.is_ready() {
            return Err(EduError::not_ready(format!(
                "azure_communication ({})",
                self.state.describe()
            )));
        }
        Ok(format!("Expert response to: {message}"))
    }
}

fn is_valid_token(token: &str) -> bool {
    let segments: Vec<&str> = token.split('.').collect();
    segments.len() == 3
        && segments.iter().all(|s| {
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '='))
        })
}

impl ServiceProvider for ExpertChatClient {
    fn info(&self) -> Arc<ProviderInfo> {
        self.info.clone()
    }

    fn state(&self) -> ProviderState {
        self.state.clone()
    }
}
