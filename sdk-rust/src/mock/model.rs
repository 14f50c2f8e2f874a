use crate::{
    LanguageModel, LanguageModelError, LanguageModelInput, LanguageModelResult, ModelResponse,
};
use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
};

const PROVIDER: &str = "mock";

/// What a queued `generate` call resolves to.
pub enum MockGenerateResult {
    Response(ModelResponse),
    Error(LanguageModelError),
}

impl MockGenerateResult {
    pub fn response(response: ModelResponse) -> Self {
        Self::Response(response)
    }

    pub fn error(error: LanguageModelError) -> Self {
        Self::Error(error)
    }
}

impl From<ModelResponse> for MockGenerateResult {
    fn from(response: ModelResponse) -> Self {
        Self::Response(response)
    }
}

impl From<LanguageModelError> for MockGenerateResult {
    fn from(error: LanguageModelError) -> Self {
        Self::Error(error)
    }
}

#[derive(Default)]
struct Calls {
    queued: VecDeque<MockGenerateResult>,
    inputs: Vec<LanguageModelInput>,
}

/// In-process model for tests. Each `generate` call records its input and
/// resolves to the oldest queued result; with nothing queued it fails with
/// an invariant error.
pub struct MockLanguageModel {
    model_id: String,
    calls: Mutex<Calls>,
}

impl Default for MockLanguageModel {
    fn default() -> Self {
        Self {
            model_id: "mock-model".to_string(),
            calls: Mutex::default(),
        }
    }
}

impl MockLanguageModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn calls(&self) -> MutexGuard<'_, Calls> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn enqueue_generate(&self, result: impl Into<MockGenerateResult>) -> &Self {
        self.calls().queued.push_back(result.into());
        self
    }

    /// Inputs of every `generate` call so far, oldest first.
    pub fn tracked_generate_inputs(&self) -> Vec<LanguageModelInput> {
        self.calls().inputs.clone()
    }

    pub fn generate_calls(&self) -> usize {
        self.calls().inputs.len()
    }

    /// Forget queued results and recorded inputs.
    pub fn restore(&self) {
        *self.calls() = Calls::default();
    }
}

#[async_trait::async_trait]
impl LanguageModel for MockLanguageModel {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        let next = {
            let mut calls = self.calls();
            calls.inputs.push(input);
            calls.queued.pop_front()
        };

        match next {
            Some(MockGenerateResult::Response(response)) => Ok(response),
            Some(MockGenerateResult::Error(error)) => Err(error),
            None => Err(LanguageModelError::Invariant(
                PROVIDER,
                "no mocked generate results available".to_string(),
            )),
        }
    }
}
