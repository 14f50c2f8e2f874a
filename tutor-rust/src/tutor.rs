use crate::{
    history::{History, HistoryStore},
    session::{Effect, GenerationRequest, Session, SessionEvent},
    GenerationError, Tutorial, TutorialService, Variant,
};
use std::{collections::HashMap, sync::Arc};
use tokio::task::{Id, JoinSet};
use tracing::{error, info_span, warn};
use tracing_futures::Instrument;

/// Runs a [`Session`] against a tutorial service and a history store.
///
/// Events are applied one at a time. Generations run as tasks in a
/// [`JoinSet`] and their outcomes are fed back into the session as
/// [`SessionEvent::Completed`] by [`Tutor::next_completion`]. A task that
/// panics still completes its request, as a failure. Must be used from
/// within a tokio runtime.
pub struct Tutor {
    session: Session,
    history: HistoryStore,
    service: Arc<dyn TutorialService>,
    tasks: JoinSet<Result<Tutorial, GenerationError>>,
    requests: HashMap<Id, GenerationRequest>,
}

impl Tutor {
    /// Create a tutor and load the persisted history.
    pub fn new(service: Arc<dyn TutorialService>, mut history: HistoryStore) -> Self {
        history.load();
        Self {
            session: Session::new(Variant::default()),
            history,
            service,
            tasks: JoinSet::new(),
            requests: HashMap::new(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn history(&self) -> &History {
        self.history.history()
    }

    /// Number of generations whose outcome has not been applied yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Apply a user intent to the session and run whatever it requires.
    pub fn dispatch(&mut self, event: SessionEvent) {
        if let Some(effect) = self.session.handle(event) {
            self.run(effect);
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::Generate(request) => self.spawn_generation(request),
            Effect::Record(entry) => {
                if let Err(error) = self.history.record(entry) {
                    warn!(%error, "failed to persist tutorial history");
                }
            }
            Effect::ClearHistory => {
                if let Err(error) = self.history.clear() {
                    warn!(%error, "failed to clear persisted tutorial history");
                }
            }
        }
    }

    fn spawn_generation(&mut self, request: GenerationRequest) {
        let service = self.service.clone();
        let span = info_span!("tutor.request", ticket = request.ticket);
        let (prompt, variant) = (request.prompt.clone(), request.variant);

        let handle = self.tasks.spawn(
            async move { service.generate(&prompt, variant).await }.instrument(span),
        );
        self.requests.insert(handle.id(), request);
    }

    /// Wait for the next generation to finish and apply its outcome. Returns
    /// `false` right away when nothing is in flight.
    pub async fn next_completion(&mut self) -> bool {
        let (id, result) = match self.tasks.join_next_with_id().await {
            None => return false,
            Some(Ok((id, result))) => (id, result),
            Some(Err(join_error)) => {
                error!(error = %join_error, "tutorial generation task failed");
                let reason = join_error.to_string();
                (join_error.id(), Err(GenerationError::Aborted(reason)))
            }
        };

        match self.requests.remove(&id) {
            Some(request) => self.dispatch(SessionEvent::Completed { request, result }),
            None => warn!(task = %id, "finished generation has no matching request"),
        }
        true
    }

    /// Apply outcomes until no generation is in flight.
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    /// Ask a question for the current variant and wait for the answer.
    pub async fn ask(&mut self, prompt: impl Into<String>) {
        self.dispatch(SessionEvent::SetPromptText(prompt.into()));
        self.dispatch(SessionEvent::Submit);
        self.settle().await;
    }
}
