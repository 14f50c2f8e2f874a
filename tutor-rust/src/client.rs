use crate::{
    errors::GenerationError, instruction, InstructionParam, Tutorial, TutorialClientParams,
    Variant,
};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info_span};
use tracing_futures::Instrument;
use tutor_sdk::{
    JSONSchema, LanguageModel, LanguageModelInput, Message, Part, ResponseFormatJson,
    ResponseFormatOption,
};

/// Anything that can turn a question about a variant into a tutorial.
///
/// Implementations make exactly one attempt per call and are safe to call
/// concurrently.
#[async_trait::async_trait]
pub trait TutorialService: Send + Sync {
    async fn generate(&self, prompt: &str, variant: Variant) -> Result<Tutorial, GenerationError>;
}

/// Builds tutorial requests for a language model and validates its replies.
///
/// The client is stateless: it holds only its configuration, so one
/// instance can serve any number of overlapping requests.
pub struct TutorialClient {
    model: Arc<dyn LanguageModel + Send + Sync>,
    instructions: Arc<Vec<InstructionParam<Variant>>>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
    timeout: Option<Duration>,
}

impl TutorialClient {
    #[must_use]
    pub fn new(params: TutorialClientParams) -> Self {
        Self {
            model: params.model,
            instructions: Arc::new(params.instructions),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            timeout: params.timeout,
        }
    }

    pub fn builder(model: Arc<dyn LanguageModel + Send + Sync>) -> TutorialClientParams {
        TutorialClientParams::new(model)
    }

    /// The request sent to the model for a question. `prompt` is expected to
    /// be validated by the caller already.
    #[must_use]
    pub fn build_input(&self, prompt: &str, variant: Variant) -> LanguageModelInput {
        LanguageModelInput {
            system_prompt: Some(instruction::get_prompt(&self.instructions, &variant)),
            messages: vec![Message::user(vec![Part::text(instruction::user_request(
                prompt,
            ))])],
            response_format: Some(ResponseFormatOption::Json(ResponseFormatJson {
                name: "tutorial".to_string(),
                description: Some(
                    "A titled tutorial made of ordered, unnumbered steps.".to_string(),
                ),
                schema: Some(tutorial_schema()),
            })),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..Default::default()
        }
    }

    /// Generate a tutorial with a single call to the model.
    pub async fn generate(
        &self,
        prompt: &str,
        variant: Variant,
    ) -> Result<Tutorial, GenerationError> {
        let input = self.build_input(prompt, variant);
        let span = info_span!(
            "tutor.generate",
            variant = %variant,
            model = %self.model.model_id(),
        );

        async move {
            let call = self.model.generate(input);
            let response = match self.timeout {
                Some(timeout) => tokio::time::timeout(timeout, call)
                    .await
                    .map_err(|_| GenerationError::Timeout(timeout))??,
                None => call.await?,
            };

            let tutorial = Tutorial::from_reply(&response.output_text())?;
            debug!(
                title = tutorial.title(),
                steps = tutorial.steps().len(),
                "generated tutorial"
            );
            Ok::<_, GenerationError>(tutorial)
        }
        .instrument(span)
        .await
    }
}

#[async_trait::async_trait]
impl TutorialService for TutorialClient {
    async fn generate(&self, prompt: &str, variant: Variant) -> Result<Tutorial, GenerationError> {
        TutorialClient::generate(self, prompt, variant).await
    }
}

/// JSON schema the model must follow: `{ title: string, steps: string[] }`.
#[must_use]
pub fn tutorial_schema() -> JSONSchema {
    json!({
        "type": "object",
        "properties": {
            "title": {
                "type": "string",
                "description": "A short, descriptive title for the tutorial."
            },
            "steps": {
                "type": "array",
                "items": { "type": "string" },
                "description": "An array of strings, where each string is a single, detailed step in the tutorial."
            }
        },
        "required": ["title", "steps"]
    })
}
