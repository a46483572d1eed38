//! Strategy layer for provider-specific behaviors.
//!
//! This module defines strategy patterns for handling differences between
//! generators, such as how a request for JSON output is expressed.

pub mod json_output;

pub use json_output::{
    detect_json_strategy, JsonOutputStrategy, PromptOnlyStrategy, SystemInstructionStrategy,
    JSON_SYSTEM_INSTRUCTION,
};
