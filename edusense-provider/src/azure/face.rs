//! Azure Face detection client with emotion attributes.

use super::{connect, AzureConnection, AzureCredentials, SUBSCRIPTION_KEY_HEADER};
use crate::http::{check_status, map_send_error};
use async_trait::async_trait;
use edusense_core::error::EduError;
use edusense_core::provider::{FaceDetector, ServiceProvider};
use edusense_core::types::*;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub struct FaceClient {
    connection: Option<AzureConnection>,
    state: ProviderState,
    info: Arc<ProviderInfo>,
}

impl std::fmt::Debug for FaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceClient")
            .field("state", &self.state)
            .finish()
    }
}

impl FaceClient {
    pub fn new(credentials: &AzureCredentials, timeout: Duration) -> Self {
        let (connection, state) = connect("face", credentials, timeout);
        Self {
            connection,
            state,
            info: Arc::new(ProviderInfo::new(
                "azure_face",
                "Azure Face",
                "Azure Face API emotion detection",
            )),
        }
    }
}

impl ServiceProvider for FaceClient {
    fn info(&self) -> Arc<ProviderInfo> {
        self.info.clone()
    }

    fn state(&self) -> ProviderState {
        self.state.clone()
    }
}

#[async_trait]
impl FaceDetector for FaceClient {
    async fn detect_faces(&self, image: &[u8]) -> Result<Vec<DetectedFace>, EduError> {
        let connection = self
            .connection
            .as_ref()
            .ok_or_else(|| EduError::not_ready(format!("azure_face ({})", self.state.describe())))?;

        let response = connection
            .http
            .post(format!("{}/face/v1.0/detect", connection.endpoint))
            .query(&[
                ("returnFaceId", "true"),
                ("returnFaceLandmarks", "false"),
                ("returnFaceAttributes", "emotion"),
            ])
            .header(SUBSCRIPTION_KEY_HEADER, &connection.key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .map_err(map_send_error)?;

        let faces: Vec<FaceDetection> = check_status(response).await?.json().await?;
        tracing::debug!(faces = faces.len(), "Azure Face detection finished");

        faces.into_iter().map(FaceDetection::into_detected).collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FaceDetection {
    face_id: Option<String>,
    face_attributes: Option<FaceAttributes>,
}

impl FaceDetection {
    /// A face without emotion attributes is a malformed answer.
    fn into_detected(self) -> Result<DetectedFace, EduError> {
        let emotion = self
            .face_attributes
            .and_then(|a| a.emotion)
            .ok_or_else(|| {
                EduError::provider(format!(
                    "face {} has no emotion attributes",
                    self.face_id.as_deref().unwrap_or("<unknown>")
                ))
            })?;

        Ok(DetectedFace {
            face_id: self.face_id,
            emotion,
        })
    }
}

#[derive(Deserialize)]
struct FaceAttributes {
    #[serde(default)]
    emotion: Option<FaceEmotions>,
}
