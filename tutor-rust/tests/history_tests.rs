use std::sync::Arc;
use video_tutor::{
    history::DEFAULT_HISTORY_KEY,
    storage::{FileStorage, MemoryStorage, Storage},
    HistoryStore, NewHistoryItem, PersistenceError, Tutorial, Variant,
};

fn entry(variant: Variant, prompt: &str, title: &str) -> NewHistoryItem {
    NewHistoryItem {
        variant,
        prompt: prompt.to_string(),
        tutorial: Tutorial::new(title, ["First step", "Second step"]).unwrap(),
    }
}

fn prompts(store: &HistoryStore) -> Vec<(Variant, String)> {
    store
        .history()
        .iter()
        .map(|item| (item.variant(), item.prompt().to_string()))
        .collect()
}

#[test]
fn load_without_a_record_is_empty() {
    let mut store = HistoryStore::new(Arc::new(MemoryStorage::new()));
    assert!(store.load().is_empty());
}

#[test]
fn record_keeps_most_recent_first() {
    let storage = Arc::new(MemoryStorage::new());
    let mut store = HistoryStore::new(storage.clone());

    store.record(entry(Variant::DavinciResolve, "A", "A")).unwrap();
    store.record(entry(Variant::SonyVegas, "B", "B")).unwrap();
    store.record(entry(Variant::FinalCutPro, "C", "C")).unwrap();

    assert_eq!(
        prompts(&store),
        vec![
            (Variant::FinalCutPro, "C".to_string()),
            (Variant::SonyVegas, "B".to_string()),
            (Variant::DavinciResolve, "A".to_string()),
        ]
    );

    let mut reloaded = HistoryStore::new(storage);
    assert_eq!(reloaded.load(), store.history());
}

#[test]
fn record_replaces_the_entry_for_the_same_question() {
    let mut store = HistoryStore::new(Arc::new(MemoryStorage::new()));

    store.record(entry(Variant::DavinciResolve, "A", "Old")).unwrap();
    store.record(entry(Variant::DavinciResolve, "B", "B")).unwrap();
    store.record(entry(Variant::SonyVegas, "A", "Other app")).unwrap();
    store.record(entry(Variant::DavinciResolve, "A", "New")).unwrap();

    let history = store.history();
    assert_eq!(history.len(), 3);

    let first = &history.items()[0];
    assert_eq!(first.variant(), Variant::DavinciResolve);
    assert_eq!(first.prompt(), "A");
    assert_eq!(first.tutorial().title(), "New");

    assert_eq!(
        prompts(&store)[1..],
        [
            (Variant::SonyVegas, "A".to_string()),
            (Variant::DavinciResolve, "B".to_string()),
        ]
    );
}

#[test]
fn ids_are_unique_and_increasing() {
    let mut store = HistoryStore::new(Arc::new(MemoryStorage::new()));
    for prompt in ["A", "B", "C", "D"] {
        store.record(entry(Variant::SonyVegas, prompt, prompt)).unwrap();
    }

    let ids: Vec<i64> = store.history().iter().map(|item| item.id()).collect();
    for pair in ids.windows(2) {
        assert!(pair[0] > pair[1], "ids not strictly decreasing: {ids:?}");
    }
    assert!(store.history().get(ids[2]).is_some());
}

#[test]
fn clear_then_load_is_empty_and_removes_the_record() {
    let storage = Arc::new(MemoryStorage::new());
    let mut store = HistoryStore::new(storage.clone());
    store.record(entry(Variant::DavinciResolve, "A", "A")).unwrap();
    assert!(storage.get(DEFAULT_HISTORY_KEY).unwrap().is_some());

    assert!(store.clear().unwrap().is_empty());
    assert!(store.load().is_empty());
    assert!(storage.get(DEFAULT_HISTORY_KEY).unwrap().is_none());
}

#[test]
fn malformed_record_is_erased() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(DEFAULT_HISTORY_KEY, b"\xff not json at all")
        .unwrap();

    let mut store = HistoryStore::new(storage.clone());
    assert!(store.load().is_empty());
    assert!(storage.get(DEFAULT_HISTORY_KEY).unwrap().is_none());
    assert!(store.load().is_empty());
}

#[test]
fn record_with_wrong_shape_is_erased() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(
            DEFAULT_HISTORY_KEY,
            br#"[{"id":1,"variant":"Premiere","prompt":"x","tutorial":{"title":"T","steps":["a"]}}]"#,
        )
        .unwrap();

    let mut store = HistoryStore::new(storage.clone());
    assert!(store.load().is_empty());
    assert!(storage.get(DEFAULT_HISTORY_KEY).unwrap().is_none());
}

#[test]
fn load_reads_records_written_with_the_app_field() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(
            DEFAULT_HISTORY_KEY,
            br#"[
                {"id":2,"app":"Final Cut Pro","prompt":"Create a multicam clip","tutorial":{"title":"Multicam","steps":["Select clips"]}},
                {"id":1,"app":"Sony Vegas","prompt":"Apply a green screen","tutorial":{"title":"Chroma Key","steps":["Step 1: Add the effect"]}}
            ]"#,
        )
        .unwrap();

    let mut store = HistoryStore::new(storage);
    let history = store.load();

    assert_eq!(history.len(), 2);
    let item = history.get(1).unwrap();
    assert_eq!(item.variant(), Variant::SonyVegas);
    assert_eq!(item.tutorial().steps(), ["Add the effect"]);
}

#[test]
fn history_is_capped_at_the_limit() {
    let mut store = HistoryStore::new(Arc::new(MemoryStorage::new())).with_limit(Some(2));
    for prompt in ["A", "B", "C"] {
        store.record(entry(Variant::DavinciResolve, prompt, prompt)).unwrap();
    }

    let kept: Vec<String> = prompts(&store).into_iter().map(|(_, p)| p).collect();
    assert_eq!(kept, ["C", "B"]);
}

#[test]
fn file_storage_persists_across_stores() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path().join("nested")));

    let mut store = HistoryStore::new(storage.clone());
    store.record(entry(Variant::FinalCutPro, "A", "A")).unwrap();
    assert!(dir.path().join("nested/videoTutorHistory.json").exists());

    let mut reloaded = HistoryStore::new(storage.clone());
    assert_eq!(reloaded.load().len(), 1);

    reloaded.clear().unwrap();
    assert!(!dir.path().join("nested/videoTutorHistory.json").exists());
    assert!(storage.get(DEFAULT_HISTORY_KEY).unwrap().is_none());
}

#[test]
fn file_storage_rejects_unsafe_record_names() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());

    assert!(matches!(
        storage.set("../escape", b"[]"),
        Err(PersistenceError::Unavailable(_))
    ));
}

struct ReadOnlyStorage;

impl Storage for ReadOnlyStorage {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &[u8]) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("read-only".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), PersistenceError> {
        Ok(())
    }
}

#[test]
fn failed_write_keeps_the_item_in_memory() {
    let mut store = HistoryStore::new(Arc::new(ReadOnlyStorage));

    assert!(store.record(entry(Variant::SonyVegas, "A", "A")).is_err());
    assert_eq!(store.history().len(), 1);
}
