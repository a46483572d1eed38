//! Azure Personalizer rank client.

use super::{connect, AzureConnection, AzureCredentials, SUBSCRIPTION_KEY_HEADER};
use crate::http::{check_status, map_send_error};
use async_trait::async_trait;
use edusense_core::error::EduError;
use edusense_core::provider::{ContentRanker, ServiceProvider};
use edusense_core::types::*;
use std::sync::Arc;
use std::time::Duration;

pub struct PersonalizerClient {
    connection: Option<AzureConnection>,
    state: ProviderState,
    info: Arc<ProviderInfo>,
}

impl std::fmt::Debug for PersonalizerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonalizerClient")
            .field("state", &self.state)
            .finish()
    }
}

impl PersonalizerClient {
    pub fn new(credentials: &AzureCredentials, timeout: Duration) -> Self {
        let (connection, state) = connect("personalizer", credentials, timeout);
        Self {
            connection,
            state,
            info: Arc::new(ProviderInfo::new(
                "azure_personalizer",
                "Azure Personalizer",
                "Azure Personalizer content ranking",
            )),
        }
    }
}

impl ServiceProvider for PersonalizerClient {
    fn info(&self) -> Arc<ProviderInfo> {
        self.info.clone()
    }

    fn state(&self) -> ProviderState {
        self.state.clone()
    }
}

#[async_trait]
impl ContentRanker for PersonalizerClient {
    async fn rank(&self, req: RankRequest) -> Result<RankResponse, EduError> {
        let connection = self.connection.as_ref().ok_or_else(|| {
            EduError::not_ready(format!("azure_personalizer ({})", self.state.describe()))
        })?;

        if req.actions.is_empty() {
            return Err(EduError::invalid_request("rank request has no actions"));
        }

        let response = connection
            .http
            .post(format!("{}/personalizer/v1.0/rank", connection.endpoint))
            .header(SUBSCRIPTION_KEY_HEADER, &connection.key)
            .json(&req)
            .send()
            .await
            .map_err(map_send_error)?;

        let ranked: RankResponse = check_status(response).await?.json().await?;
        tracing::debug!(reward_action_id = %ranked.reward_action_id, "Personalizer rank finished");
        Ok(ranked)
    }
}
