//! Shared HTTP plumbing for the REST providers.

use edusense_core::error::EduError;
use std::time::Duration;

/// Default per-request timeout for remote calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, EduError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(EduError::from)
}

pub(crate) fn map_send_error(err: reqwest::Error) -> EduError {
    if err.is_timeout() {
        EduError::timeout(err.to_string())
    } else {
        EduError::Network(err)
    }
}

/// Turn a non-success response into an error carrying the body text.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, EduError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(EduError::from_status(status.as_u16(), body))
}

pub(crate) fn trim_endpoint(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_string()
}
