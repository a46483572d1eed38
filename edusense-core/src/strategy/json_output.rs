//! JSON output strategies for different generators.
//!
//! - SystemInstructionStrategy: backends that honour a system instruction (Gemini, OpenAI)
//! - PromptOnlyStrategy: backends that only see the prompt text (mock)

use crate::error::EduError;
use crate::types::TextRequest;

/// System instruction attached to prompts that ask for JSON.
pub const JSON_SYSTEM_INSTRUCTION: &str = "You are a helpful AI assistant that generates valid, \
well-formatted JSON output with no additional text.";

/// Strategy for preparing a request whose answer must contain JSON.
pub trait JsonOutputStrategy: Send + Sync {
    /// Get the strategy name for debugging
    fn name(&self) -> &str;

    /// Adjust the request so the backend favours structured output.
    fn apply(&self, req: &mut TextRequest) -> Result<(), EduError>;
}

/// Attaches a JSON-only system instruction and switches the request into
/// JSON mode (low temperature, full nucleus).
#[derive(Debug, Clone)]
pub struct SystemInstructionStrategy {
    /// Instruction text placed in the system slot
    pub instruction: String,
}

impl SystemInstructionStrategy {
    /// Create the strategy with the default instruction
    pub fn new() -> Self {
        Self {
            instruction: JSON_SYSTEM_INSTRUCTION.to_string(),
        }
    }

    /// Create the strategy with a custom instruction
    pub fn with_instruction(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
        }
    }
}

impl Default for SystemInstructionStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonOutputStrategy for SystemInstructionStrategy {
    fn name(&self) -> &str {
        "SystemInstructionStrategy"
    }

    fn apply(&self, req: &mut TextRequest) -> Result<(), EduError> {
        if !req.wants_json() {
            return Ok(());
        }

        req.system = Some(match req.system.take() {
            Some(existing) => format!("{}\n\n{}", existing, self.instruction),
            None => self.instruction.clone(),
        });
        req.json_mode = true;
        req.params.temperature = Some(0.1);
        req.params.top_p = Some(1.0);

        Ok(())
    }
}

/// Leaves the request untouched. The prompt itself already spells out the
/// expected structure.
#[derive(Debug, Clone, Default)]
pub struct PromptOnlyStrategy;

impl PromptOnlyStrategy {
    /// Create a new prompt-only strategy
    pub fn new() -> Self {
        Self
    }
}

impl JsonOutputStrategy for PromptOnlyStrategy {
    fn name(&self) -> &str {
        "PromptOnlyStrategy"
    }

    fn apply(&self, _req: &mut TextRequest) -> Result<(), EduError> {
        Ok(())
    }
}

/// Pick the JSON strategy for a generator id.
pub fn detect_json_strategy(provider_id: &str) -> Box<dyn JsonOutputStrategy> {
    match provider_id {
        "gemini" | "openai" => Box::new(SystemInstructionStrategy::new()),
        "mock" => Box::new(PromptOnlyStrategy::new()),
        _ => Box::new(SystemInstructionStrategy::new()),
    }
}
