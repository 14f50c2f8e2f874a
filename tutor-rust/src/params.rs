use crate::{instruction, InstructionParam, TutorialClient, Variant};
use std::{sync::Arc, time::Duration};
use tutor_sdk::LanguageModel;

/// Parameters required to create a new tutorial client.
/// # Default Values
/// - `instructions`: the tutor role, the variant guidance and the response
///   rules
/// - `temperature`: `None`
/// - `max_tokens`: `None`
/// - `timeout`: `None`
pub struct TutorialClientParams {
    /// The language model that generates the tutorials.
    pub model: Arc<dyn LanguageModel + Send + Sync>,
    /// Instructions joined into the system prompt of every request.
    pub instructions: Vec<InstructionParam<Variant>>,
    /// Amount of randomness injected into the response. Ranges from 0.0 to 1.0
    pub temperature: Option<f64>,
    /// The maximum number of tokens the model may generate per tutorial.
    pub max_tokens: Option<u32>,
    /// Upper bound on a single call. Without it a hung call stays pending
    /// until the transport gives up.
    pub timeout: Option<Duration>,
}

impl TutorialClientParams {
    pub fn new(model: Arc<dyn LanguageModel + Send + Sync>) -> Self {
        Self {
            model,
            instructions: instruction::default_instructions(),
            temperature: None,
            max_tokens: None,
            timeout: None,
        }
    }

    /// Add an instruction after the existing ones
    #[must_use]
    pub fn add_instruction(mut self, instruction: impl Into<InstructionParam<Variant>>) -> Self {
        self.instructions.push(instruction.into());
        self
    }

    /// Replace all instructions
    #[must_use]
    pub fn instructions(mut self, instructions: Vec<InstructionParam<Variant>>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Set the temperature for sampling
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the max tokens
    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the per-call timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn build(self) -> TutorialClient {
        TutorialClient::new(self)
    }
}
