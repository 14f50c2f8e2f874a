//! The state behind the tutor's user interface, as a plain value advanced by
//! [`Session::handle`].
//!
//! The session never performs I/O. Events that need the outside world return
//! an [`Effect`] for the caller to run; the outcome of a generation comes back
//! as [`SessionEvent::Completed`].

use crate::{
    errors::{GenerationError, ValidationError},
    history::{HistoryItem, NewHistoryItem},
    Tutorial, Variant,
};
use tracing::{debug, error};

/// Where the session is in the ask/answer cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing asked yet for the current variant.
    #[default]
    Initial,
    /// Waiting on the generation identified by `ticket`.
    Loading { ticket: u64, prompt: String },
    Success { prompt: String, tutorial: Tutorial },
    /// The last generation failed; `message` is safe to show to the user.
    Failed { prompt: String, message: &'static str },
}

/// A single generation the session asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub ticket: u64,
    pub variant: Variant,
    pub prompt: String,
}

/// User intents, plus the completion of a generation.
#[derive(Debug)]
pub enum SessionEvent {
    SelectVariant(Variant),
    SetPromptText(String),
    Submit,
    SelectHistoryItem(HistoryItem),
    ClearHistory,
    Completed {
        request: GenerationRequest,
        result: Result<Tutorial, GenerationError>,
    },
}

/// Work the caller must carry out on behalf of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Call the tutorial service and feed the outcome back as
    /// [`SessionEvent::Completed`].
    Generate(GenerationRequest),
    /// Add a successful generation to the history.
    Record(NewHistoryItem),
    ClearHistory,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    variant: Variant,
    prompt_text: String,
    state: SessionState,
    inline_error: Option<ValidationError>,
    next_ticket: u64,
}

impl Session {
    #[must_use]
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Apply an event and return the effect it requires, if any.
    pub fn handle(&mut self, event: SessionEvent) -> Option<Effect> {
        match event {
            SessionEvent::SelectVariant(variant) => {
                self.select_variant(variant);
                None
            }
            SessionEvent::SetPromptText(text) => {
                self.prompt_text = text;
                None
            }
            SessionEvent::Submit => self.submit(),
            SessionEvent::SelectHistoryItem(item) => {
                self.replay(&item);
                None
            }
            SessionEvent::ClearHistory => Some(Effect::ClearHistory),
            SessionEvent::Completed { request, result } => self.complete(request, result),
        }
    }

    fn select_variant(&mut self, variant: Variant) {
        if variant == self.variant {
            return;
        }
        debug!(from = %self.variant, to = %variant, "variant changed");
        self.variant = variant;
        self.prompt_text.clear();
        self.state = SessionState::Initial;
        self.inline_error = None;
    }

    fn submit(&mut self) -> Option<Effect> {
        let prompt = self.prompt_text.trim();
        if prompt.is_empty() {
            self.inline_error = Some(ValidationError::PromptRequired);
            return None;
        }

        let request = GenerationRequest {
            ticket: self.next_ticket,
            variant: self.variant,
            prompt: prompt.to_string(),
        };
        self.next_ticket += 1;
        self.inline_error = None;
        self.state = SessionState::Loading {
            ticket: request.ticket,
            prompt: request.prompt.clone(),
        };
        debug!(ticket = request.ticket, variant = %request.variant, "submitted prompt");
        Some(Effect::Generate(request))
    }

    fn replay(&mut self, item: &HistoryItem) {
        self.variant = item.variant();
        self.prompt_text = item.prompt().to_string();
        self.inline_error = None;
        self.state = SessionState::Success {
            prompt: item.prompt().to_string(),
            tutorial: item.tutorial().clone(),
        };
    }

    fn complete(
        &mut self,
        request: GenerationRequest,
        result: Result<Tutorial, GenerationError>,
    ) -> Option<Effect> {
        let current = matches!(
            self.state,
            SessionState::Loading { ticket, .. } if ticket == request.ticket
        ) && request.variant == self.variant;
        if !current {
            debug!(
                ticket = request.ticket,
                variant = %request.variant,
                "discarding stale generation result"
            );
            return None;
        }

        match result {
            Ok(tutorial) => {
                self.state = SessionState::Success {
                    prompt: request.prompt.clone(),
                    tutorial: tutorial.clone(),
                };
                Some(Effect::Record(NewHistoryItem {
                    variant: request.variant,
                    prompt: request.prompt,
                    tutorial,
                }))
            }
            Err(err) => {
                error!(
                    error = %err,
                    ticket = request.ticket,
                    variant = %request.variant,
                    prompt = %request.prompt,
                    "tutorial generation failed"
                );
                self.state = SessionState::Failed {
                    prompt: request.prompt,
                    message: err.user_message(),
                };
                None
            }
        }
    }

    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[must_use]
    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn is_initial(&self) -> bool {
        matches!(self.state, SessionState::Initial)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Loading { .. })
    }

    #[must_use]
    pub fn current_tutorial(&self) -> Option<&Tutorial> {
        match &self.state {
            SessionState::Success { tutorial, .. } => Some(tutorial),
            _ => None,
        }
    }

    #[must_use]
    pub fn inline_error(&self) -> Option<&ValidationError> {
        self.inline_error.as_ref()
    }

    /// The message to show under the prompt field, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&'static str> {
        match (&self.inline_error, &self.state) {
            (Some(ValidationError::PromptRequired), _) => {
                Some(crate::errors::PROMPT_REQUIRED_MESSAGE)
            }
            (None, SessionState::Failed { message, .. }) => Some(*message),
            (None, _) => None,
        }
    }

    /// Suggestions for the current variant, offered while nothing was asked
    /// yet.
    #[must_use]
    pub fn example_prompts(&self) -> [&'static str; 3] {
        self.variant.example_prompts()
    }
}
