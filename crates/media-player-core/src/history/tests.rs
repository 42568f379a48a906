use super::*;
use crate::store::MemoryStore;
use chrono::Duration;
use media_player_models::ContentKind;

fn repository() -> (MemoryStore, HistoryRepository) {
    let store = MemoryStore::new();
    let repo = HistoryRepository::new(Arc::new(store.clone()));
    (store, repo)
}

fn movie(id: &str) -> HistoryEntry {
    HistoryEntry::movie(id, format!("Movie {}", id), format!("https://cdn.example/{}.mp4", id))
}

#[test]
fn test_cap_keeps_most_recent_fifty() {
    let (_, repo) = repository();

    for i in 0..60 {
        repo.record_start(movie(&format!("m{}", i))).unwrap();
    }

    let entries = repo.list().unwrap();
    assert_eq!(entries.len(), 50);
    assert_eq!(entries[0].id, "m59");
    assert_eq!(entries[49].id, "m10");
    assert!(entries.iter().all(|e| e.id != "m9"));
}

#[test]
fn test_record_start_replaces_and_returns_previous_progress() {
    let (_, repo) = repository();
    repo.record_start(movie("a")).unwrap();
    repo.upsert("a", HistoryPatch { progress: 95.0, duration: Some(300.0) }).unwrap();
    repo.record_start(movie("b")).unwrap();

    let previous = repo.record_start(movie("a")).unwrap();

    assert_eq!(previous, Some(95.0));
    let entries = repo.list().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "a");
    assert_eq!(entries[0].progress, 0.0);
}

#[test]
fn test_upsert_twice_only_refreshes_timestamp() {
    let (_, repo) = repository();
    repo.record_start(movie("a")).unwrap();
    repo.record_start(movie("b")).unwrap();

    let patch = HistoryPatch { progress: 42.0, duration: Some(600.0) };
    assert!(repo.upsert("a", patch).unwrap());
    let first = repo.get("a").unwrap().unwrap();
    assert!(repo.upsert("a", patch).unwrap());
    let second = repo.get("a").unwrap().unwrap();

    assert_eq!(repo.list().unwrap().len(), 2);
    assert_eq!(first.progress, second.progress);
    assert_eq!(first.duration, second.duration);
    assert!(second.timestamp >= first.timestamp);
    assert_eq!(repo.list().unwrap()[0].id, "a");
}

#[test]
fn test_upsert_never_inserts() {
    let (store, repo) = repository();

    let updated = repo.upsert("ghost", HistoryPatch { progress: 10.0, duration: None }).unwrap();

    assert!(!updated);
    assert!(repo.list().unwrap().is_empty());
    assert_eq!(store.get(DEFAULT_STORAGE_KEY).unwrap(), None);
}

#[test]
fn test_upsert_keeps_duration_when_unknown() {
    let (_, repo) = repository();
    repo.record_start(movie("a")).unwrap();
    repo.upsert("a", HistoryPatch { progress: 5.0, duration: Some(120.0) }).unwrap();
    repo.upsert("a", HistoryPatch { progress: 7.0, duration: None }).unwrap();
    repo.upsert("a", HistoryPatch { progress: 8.0, duration: Some(f64::NAN) }).unwrap();

    let entry = repo.get("a").unwrap().unwrap();
    assert_eq!(entry.progress, 8.0);
    assert_eq!(entry.duration, 120.0);
}

#[test]
fn test_list_sorts_by_timestamp() {
    let (store, repo) = repository();
    let now = Utc::now();
    let mut old = movie("old");
    old.timestamp = now - Duration::days(2);
    let mut new = movie("new");
    new.timestamp = now;
    store
        .set(DEFAULT_STORAGE_KEY, &serde_json::to_string(&vec![old, new]).unwrap())
        .unwrap();

    let ids: Vec<_> = repo.list().unwrap().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["new", "old"]);
}

#[test]
fn test_evict_overflow_after_external_write() {
    let (store, repo) = repository();
    let now = Utc::now();
    let entries: Vec<_> = (0..55)
        .map(|i| {
            let mut entry = movie(&format!("m{}", i));
            entry.timestamp = now - Duration::minutes(i);
            entry
        })
        .collect();
    store
        .set(DEFAULT_STORAGE_KEY, &serde_json::to_string(&entries).unwrap())
        .unwrap();

    assert_eq!(repo.evict_overflow().unwrap(), 5);
    let kept = repo.list().unwrap();
    assert_eq!(kept.len(), 50);
    assert_eq!(kept.last().unwrap().id, "m49");
    assert_eq!(repo.evict_overflow().unwrap(), 0);
}

#[test]
fn test_remove_and_clear() {
    let (store, repo) = repository();
    repo.record_start(movie("a")).unwrap();
    let mut episode = movie("e1");
    episode.kind = ContentKind::Series;
    repo.record_start(episode).unwrap();

    assert!(repo.remove("a").unwrap());
    assert!(!repo.remove("a").unwrap());
    assert_eq!(repo.list().unwrap().len(), 1);

    repo.clear().unwrap();
    assert!(repo.list().unwrap().is_empty());
    assert_eq!(store.get(DEFAULT_STORAGE_KEY).unwrap(), None);
}

#[test]
fn test_corrupted_value_reads_as_empty() {
    let (store, repo) = repository();
    store.set(DEFAULT_STORAGE_KEY, "not json").unwrap();

    assert!(repo.list().unwrap().is_empty());
    repo.record_start(movie("a")).unwrap();
    assert_eq!(repo.list().unwrap().len(), 1);
}

#[test]
fn test_custom_key_and_cap() {
    let store = MemoryStore::new();
    let config = HistoryConfig {
        max_entries: 2,
        storage_key: "history_v2".to_string(),
    };
    let repo = HistoryRepository::with_config(Arc::new(store.clone()), &config);

    for id in ["a", "b", "c"] {
        repo.record_start(movie(id)).unwrap();
    }

    assert_eq!(repo.list().unwrap().len(), 2);
    assert!(store.get("history_v2").unwrap().is_some());
    assert_eq!(store.get(DEFAULT_STORAGE_KEY).unwrap(), None);
}
