//! Runtime layer for edusense.
//!
//! This module sits between the services (emotion analysis, tutoring) and
//! the raw providers. It is responsible for:
//! - Asking generators for JSON with the right strategy and normalizing the answer
//! - Composing generators with layers (logging, retry)
//! - Running ordered fallback chains that always end in a usable value

pub mod chain;
pub mod generation;

pub use chain::{ChainReport, FallbackChain, Normalized, ProviderOutcome};
pub use generation::{GenerationRuntime, GenerationRuntimeBuilder, StructuredError};
