//! # edusense layers
//!
//! Built-in layers for text generators.
//!
//! Currently implemented layers:
//! - `LoggingLayer`: Logs every generation with timing information
//! - `RetryLayer`: Automatic retry with exponential backoff for retryable errors
//!
//! ## Usage
//!
//! ```ignore
//! use edusense_core::GenerationRuntime;
//! use edusense_layer::{LoggingLayer, RetryLayer};
//!
//! let runtime = GenerationRuntime::builder(generator)
//!     .layer(LoggingLayer::new())
//!     .layer(RetryLayer::new().with_max_retries(3))
//!     .finish();
//! ```

pub mod logging;
pub mod retry;

// Re-exports
pub use logging::LoggingLayer;
pub use retry::RetryLayer;
