//! Ordered fallback chains.
//!
//! A [`FallbackChain`] holds one lazily evaluated attempt per provider. The
//! attempts run in insertion order until one succeeds; providers whose state
//! is not `Ready` are skipped without being polled. When every attempt fails
//! the caller-supplied placeholder is returned, so resolving a chain cannot
//! fail.

use crate::error::EduError;
use crate::types::{ProviderState, RequestContext, PLACEHOLDER_PROVIDER};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Result of attempting one provider
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome<T> {
    Success { provider: String, value: T },
    Failure { provider: String, reason: String },
}

impl<T> ProviderOutcome<T> {
    /// Provider the outcome belongs to
    pub fn provider(&self) -> &str {
        match self {
            ProviderOutcome::Success { provider, .. } | ProviderOutcome::Failure { provider, .. } => {
                provider
            }
        }
    }

    /// Whether the attempt succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, ProviderOutcome::Success { .. })
    }
}

/// The value surfaced by a chain, tagged with the provider that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalized<T> {
    pub value: T,
    pub provider: String,
    /// Informational note, set when the placeholder was used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl<T> Normalized<T> {
    /// Tag a value with its provider
    pub fn new(provider: impl Into<String>, value: T) -> Self {
        Self {
            value,
            provider: provider.into(),
            note: None,
        }
    }

    /// A placeholder value with an explanatory note
    pub fn placeholder(value: T, note: impl Into<String>) -> Self {
        Self {
            value,
            provider: PLACEHOLDER_PROVIDER.to_string(),
            note: Some(note.into()),
        }
    }

    /// Whether the value came from the placeholder
    pub fn is_placeholder(&self) -> bool {
        self.provider == PLACEHOLDER_PROVIDER
    }

    /// Transform the value, keeping provider and note
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Normalized<U> {
        Normalized {
            value: f(self.value),
            provider: self.provider,
            note: self.note,
        }
    }
}

/// Everything that happened while resolving a chain
#[derive(Debug, Clone)]
pub struct ChainReport<T> {
    pub result: Normalized<T>,
    /// Failed attempts, in order
    pub failures: Vec<ProviderOutcome<T>>,
}

struct Step<'a, T> {
    provider: String,
    state: ProviderState,
    run: BoxFuture<'a, Result<T, EduError>>,
}

/// An ordered list of provider attempts ending in a placeholder.
pub struct FallbackChain<'a, T> {
    ctx: RequestContext,
    steps: Vec<Step<'a, T>>,
}

impl<'a, T: Send + 'a> FallbackChain<'a, T> {
    /// Start a chain for the named operation
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            ctx: RequestContext::new(operation),
            steps: Vec::new(),
        }
    }

    /// Append a provider attempt. `run` is only polled if every earlier
    /// attempt failed and `state` is `Ready`.
    pub fn step<F>(mut self, provider: impl Into<String>, state: ProviderState, run: F) -> Self
    where
        F: Future<Output = Result<T, EduError>> + Send + 'a,
    {
        self.steps.push(Step {
            provider: provider.into(),
            state,
            run: Box::pin(run),
        });
        self
    }

    /// Append an attempt for a provider that is always available
    pub fn attempt<F>(self, provider: impl Into<String>, run: F) -> Self
    where
        F: Future<Output = Result<T, EduError>> + Send + 'a,
    {
        self.step(provider, ProviderState::Ready, run)
    }

    /// Number of configured attempts
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no attempts were configured
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run the chain and surface exactly one result.
    pub async fn resolve(
        self,
        note: impl Into<String>,
        placeholder: impl FnOnce() -> T,
    ) -> Normalized<T> {
        self.resolve_with_report(note, placeholder).await.result
    }

    /// Run the chain, also returning the failed attempts.
    pub async fn resolve_with_report(
        self,
        note: impl Into<String>,
        placeholder: impl FnOnce() -> T,
    ) -> ChainReport<T> {
        let ctx = self.ctx;
        let mut failures = Vec::new();

        for step in self.steps {
            match run_step(&ctx, step).await {
                ProviderOutcome::Success { provider, value } => {
                    tracing::debug!(
                        request_id = %ctx.request_id,
                        operation = %ctx.operation,
                        provider = %provider,
                        "provider succeeded"
                    );
                    return ChainReport {
                        result: Normalized::new(provider, value),
                        failures,
                    };
                }
                failure => failures.push(failure),
            }
        }

        let note = note.into();
        tracing::info!(
            request_id = %ctx.request_id,
            operation = %ctx.operation,
            attempts = failures.len(),
            "all providers failed, using placeholder"
        );

        ChainReport {
            result: Normalized::placeholder(placeholder(), note),
            failures,
        }
    }
}

async fn run_step<T>(ctx: &RequestContext, step: Step<'_, T>) -> ProviderOutcome<T> {
    let Step {
        provider,
        state,
        run,
    } = step;

    if !state.is_ready() {
        let reason = state.describe();
        tracing::debug!(
            request_id = %ctx.request_id,
            operation = %ctx.operation,
            provider = %provider,
            reason = %reason,
            "skipping provider"
        );
        return ProviderOutcome::Failure { provider, reason };
    }

    tracing::debug!(
        request_id = %ctx.request_id,
        operation = %ctx.operation,
        provider = %provider,
        "attempting provider"
    );

    match run.await {
        Ok(value) => ProviderOutcome::Success { provider, value },
        Err(err) => {
            tracing::warn!(
                request_id = %ctx.request_id,
                operation = %ctx.operation,
                provider = %provider,
                error = %err,
                "provider failed"
            );
            ProviderOutcome::Failure {
                provider,
                reason: err.to_string(),
            }
        }
    }
}
