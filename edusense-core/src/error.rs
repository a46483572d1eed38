//! Error types for edusense operations.

/// The main error type for provider calls and response normalization.
///
/// Service-level operations never surface this type to their callers: every
/// variant is absorbed by a fallback chain and turned into a degraded result.
#[derive(Debug, thiserror::Error)]
pub enum EduError {
    /// Provider-specific errors
    #[error("Provider error: {0}")]
    Provider(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Rate limit errors
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Invalid request errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found errors
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Timeout errors
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The provider is not in the `Ready` state
    #[error("Provider {0} is not ready")]
    NotReady(String),

    /// No JSON block could be located in a text response
    #[error("No JSON found in response")]
    NoJsonFound,

    /// Required schema fields are absent
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Parsed JSON does not have the expected container shape
    #[error("Unexpected response shape: {0}")]
    ShapeMismatch(String),

    /// Generic errors
    #[error("Error: {0}")]
    Other(String),
}

impl EduError {
    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create an authentication error
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limit(msg: impl Into<String>) -> Self {
        Self::RateLimit(msg.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a model not found error
    pub fn model_not_found(msg: impl Into<String>) -> Self {
        Self::ModelNotFound(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a not-ready error for the given provider id
    pub fn not_ready(provider: impl Into<String>) -> Self {
        Self::NotReady(provider.into())
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Map an HTTP status and body from a remote API into an error
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => Self::Authentication(body),
            404 => Self::ModelNotFound(body),
            408 | 504 => Self::Timeout(body),
            429 => Self::RateLimit(body),
            400 | 422 => Self::InvalidRequest(body),
            _ => Self::Provider(format!("HTTP {status}: {body}")),
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EduError::Network(_) | EduError::Timeout(_) | EduError::RateLimit(_)
        )
    }
}

impl From<String> for EduError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for EduError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            EduError::from_status(401, "bad key"),
            EduError::Authentication(_)
        ));
        assert!(matches!(
            EduError::from_status(429, "slow down"),
            EduError::RateLimit(_)
        ));
        assert!(matches!(
            EduError::from_status(500, "boom"),
            EduError::Provider(_)
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(EduError::timeout("t").is_retryable());
        assert!(EduError::rate_limit("r").is_retryable());
        assert!(!EduError::NoJsonFound.is_retryable());
        assert!(!EduError::authentication("a").is_retryable());
    }

    #[test]
    fn test_missing_fields_message() {
        let err = EduError::MissingFields(vec!["title".into(), "link".into()]);
        assert_eq!(err.to_string(), "Missing required fields: title, link");
    }
}
