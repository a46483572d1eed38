//! Retry layer for transient generation failures.
//!
//! Only errors where [`EduError::is_retryable`] holds are retried. Backoff
//! doubles per attempt up to `max_delay`; rate-limit errors wait at least
//! `rate_limit_delay`.

use async_trait::async_trait;
use edusense_core::error::EduError;
use edusense_core::layer::{Layer, LayeredGenerator};
use edusense_core::provider::{ServiceProvider, TextGenerator};
use edusense_core::types::*;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryLayer {
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
    rate_limit_delay: Duration,
}

impl RetryLayer {
    /// Two retries starting at 200ms, capped at 5s
    pub fn new() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            rate_limit_delay: Duration::from_secs(1),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Minimum wait after a rate-limit response
    pub fn with_rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    /// Wait before retry number `attempt + 1`
    fn delay_for(&self, attempt: u32, error: &EduError) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let backoff = self.initial_delay.saturating_mul(factor).min(self.max_delay);
        match error {
            EduError::RateLimit(_) => backoff.max(self.rate_limit_delay),
            _ => backoff,
        }
    }
}

impl Default for RetryLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: TextGenerator> Layer<G> for RetryLayer {
    type LayeredGenerator = RetryGenerator<G>;

    fn layer(&self, inner: G) -> Self::LayeredGenerator {
        RetryGenerator {
            inner,
            policy: self.clone(),
        }
    }
}

/// Generator wrapped with retry logic
#[derive(Debug)]
pub struct RetryGenerator<G> {
    inner: G,
    policy: RetryLayer,
}

#[async_trait]
impl<G: TextGenerator> LayeredGenerator for RetryGenerator<G> {
    type Inner = G;

    fn inner(&self) -> &Self::Inner {
        &self.inner
    }

    async fn layered_generate_text(&self, req: TextRequest) -> Result<TextResult, EduError> {
        let generator = self.inner.info().id.clone();
        let mut attempt = 0;

        loop {
            let error = match self.inner.generate_text(req.clone()).await {
                Ok(result) => {
                    if attempt > 0 {
                        tracing::debug!(
                            generator = %generator,
                            attempts = attempt + 1,
                            "generation succeeded after retry"
                        );
                    }
                    return Ok(result);
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => e,
            };

            if attempt >= self.policy.max_retries {
                tracing::warn!(
                    generator = %generator,
                    attempts = attempt + 1,
                    error = %error,
                    "generation retries exhausted"
                );
                return Err(error);
            }

            let delay = self.policy.delay_for(attempt, &error);
            tracing::debug!(
                generator = %generator,
                retry = attempt + 1,
                max_retries = self.policy.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "retrying generation"
            );

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

impl<G: TextGenerator> ServiceProvider for RetryGenerator<G> {
    fn info(&self) -> Arc<ProviderInfo> {
        LayeredGenerator::layered_info(self)
    }

    fn state(&self) -> ProviderState {
        LayeredGenerator::layered_state(self)
    }
}

#[async_trait]
impl<G: TextGenerator> TextGenerator for RetryGenerator<G> {
    async fn generate_text(&self, req: TextRequest) -> Result<TextResult, EduError> {
        LayeredGenerator::layered_generate_text(self, req).await
    }
}
