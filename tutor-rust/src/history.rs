use crate::{errors::PersistenceError, storage::Storage, Tutorial, Variant};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, warn};

/// Record name the history is persisted under.
pub const DEFAULT_HISTORY_KEY: &str = "videoTutorHistory";

/// Number of tutorials kept when no other limit is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// A tutorial generated in the past, together with the question that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    id: i64,
    #[serde(alias = "app")]
    variant: Variant,
    prompt: String,
    tutorial: Tutorial,
}

impl HistoryItem {
    #[must_use]
    pub fn id(&self) -> i64 {
        self.id
    }

    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn tutorial(&self) -> &Tutorial {
        &self.tutorial
    }

    fn same_question(&self, variant: Variant, prompt: &str) -> bool {
        self.variant == variant && self.prompt == prompt
    }
}

/// A history entry that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryItem {
    pub variant: Variant,
    pub prompt: String,
    pub tutorial: Tutorial,
}

/// Past tutorials, most recent first, with at most one entry per
/// (variant, prompt) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<HistoryItem>);

impl History {
    #[must_use]
    pub fn items(&self) -> &[HistoryItem] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryItem> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: i64) -> Option<&HistoryItem> {
        self.0.iter().find(|item| item.id == id)
    }

    fn next_id(&self, now: i64) -> i64 {
        match self.0.iter().map(|item| item.id).max() {
            Some(max) if max >= now => max + 1,
            _ => now,
        }
    }

    fn push_front(&mut self, item: HistoryItem) {
        self.0
            .retain(|existing| !existing.same_question(item.variant, &item.prompt));
        self.0.insert(0, item);
    }

    /// Drop later duplicates of a (variant, prompt) pair, keeping the most
    /// recent one.
    fn dedup(&mut self) {
        let mut seen = HashSet::new();
        self.0
            .retain(|item| seen.insert((item.variant, item.prompt.clone())));
    }

    fn truncate(&mut self, limit: Option<usize>) {
        if let Some(limit) = limit {
            self.0.truncate(limit);
        }
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a HistoryItem;
    type IntoIter = std::slice::Iter<'a, HistoryItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Sole owner of the persisted history record.
///
/// Every mutation updates the in-memory history first and then writes the
/// whole sequence back. When the write fails the error is returned, but the
/// in-memory history keeps the change and stays authoritative for the rest of
/// the process.
pub struct HistoryStore {
    storage: Arc<dyn Storage>,
    key: String,
    limit: Option<usize>,
    history: History,
}

impl HistoryStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            key: DEFAULT_HISTORY_KEY.to_string(),
            limit: Some(DEFAULT_HISTORY_LIMIT),
            history: History::default(),
        }
    }

    /// Persist under another record name
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Keep at most `limit` items, `None` keeps everything
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Read the persisted history. A missing record is an empty history; an
    /// unreadable or malformed record is erased and also yields an empty
    /// history.
    pub fn load(&mut self) -> &History {
        self.history = match self.storage.get(&self.key) {
            Ok(None) => History::default(),
            Ok(Some(bytes)) => match serde_json::from_slice::<History>(&bytes) {
                Ok(mut history) => {
                    history.dedup();
                    history.truncate(self.limit);
                    debug!(items = history.len(), "loaded tutorial history");
                    history
                }
                Err(source) => {
                    let error = PersistenceError::Corrupt(source.to_string());
                    warn!(%error, key = %self.key, "discarding malformed tutorial history");
                    self.erase();
                    History::default()
                }
            },
            Err(error) => {
                warn!(%error, key = %self.key, "failed to read tutorial history");
                self.erase();
                History::default()
            }
        };
        &self.history
    }

    /// Prepend a new item, replacing any item for the same (variant, prompt)
    /// pair, and persist the result.
    pub fn record(&mut self, entry: NewHistoryItem) -> Result<&History, PersistenceError> {
        let id = self.history.next_id(chrono::Utc::now().timestamp_millis());
        self.history.push_front(HistoryItem {
            id,
            variant: entry.variant,
            prompt: entry.prompt,
            tutorial: entry.tutorial,
        });
        self.history.truncate(self.limit);

        let bytes = serde_json::to_vec(&self.history)?;
        self.storage.set(&self.key, &bytes)?;
        Ok(&self.history)
    }

    /// Forget every item and delete the persisted record.
    pub fn clear(&mut self) -> Result<&History, PersistenceError> {
        self.history = History::default();
        self.storage.remove(&self.key)?;
        Ok(&self.history)
    }

    fn erase(&self) {
        if let Err(error) = self.storage.remove(&self.key) {
            warn!(%error, key = %self.key, "failed to erase tutorial history");
        }
    }
}
