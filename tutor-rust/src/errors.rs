use std::time::Duration;
use thiserror::Error;

/// Message shown to the user for every failed generation, whatever the cause.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Sorry, I couldn't generate a tutorial. Please try again.";

/// Message shown inline when a submit is attempted without a question.
pub const PROMPT_REQUIRED_MESSAGE: &str = "Please enter a question.";

/// Why a call to the generation service did not produce a tutorial.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Transport failure, non-success status, refusal or any other failure
    /// reported by the model layer.
    #[error("Language model error: {0}")]
    Model(#[from] tutor_sdk::LanguageModelError),
    #[error("The model returned an empty reply")]
    EmptyReply,
    #[error("The model reply is not valid JSON: {0}")]
    MalformedReply(#[source] serde_json::Error),
    #[error("The model reply does not match the tutorial schema: {0}")]
    SchemaMismatch(String),
    #[error("The model did not reply within {0:?}")]
    Timeout(Duration),
    /// The generation task panicked or was cancelled before it replied.
    #[error("Generation task failed: {0}")]
    Aborted(String),
}

impl GenerationError {
    /// The uniform message surfaced to the user. The detailed reason is only
    /// meant for logs.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn user_message(&self) -> &'static str {
        GENERATION_FAILED_MESSAGE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a question.")]
    PromptRequired,
}

/// Failure to read or write the persisted history record.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Persisted record is corrupt: {0}")]
    Corrupt(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(&'static str),
}

/// Failure to render an export document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write PDF: {0}")]
    Pdf(String),
}
