//! Saved filters persisted through a directory-backed store.

use gridline_query::{
    load_filters, save_filters, FileStore, FilterCondition, KeyValueStore, SavedFilterPatch,
    SavedFilterSet, DEFAULT_STORAGE_KEY,
};
use tempfile::TempDir;

fn conditions() -> Vec<FilterCondition> {
    vec![
        FilterCondition::new("status", "equals", "active"),
        FilterCondition::new("age", "between", (18, 65)),
    ]
}

#[test]
fn filters_survive_a_new_store_instance() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    let mut set = SavedFilterSet::new(DEFAULT_STORAGE_KEY);
    set.save_current("Adults", &conditions(), Some("18 to 65".into()));
    set.flush(&store).unwrap();

    let reopened = FileStore::open(dir.path()).unwrap();
    let loaded = SavedFilterSet::load(&reopened, DEFAULT_STORAGE_KEY);
    assert_eq!(loaded, set);

    let adults = loaded.find_by_name("Adults").unwrap();
    assert_eq!(adults.conditions.len(), 2);
    assert_eq!(adults.conditions[1].value.to_text(), "18,65");
    assert_eq!(adults.description.as_deref(), Some("18 to 65"));
}

#[test]
fn nothing_is_written_until_flush() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    let mut set = SavedFilterSet::load(&store, "team");
    let id = set.save_current("Mine", &conditions(), None).id.clone();
    assert_eq!(store.get("team").unwrap(), None);

    set.flush(&store).unwrap();
    set.update(&id, SavedFilterPatch::new().name("Renamed"))
        .unwrap();
    assert_eq!(
        SavedFilterSet::load(&store, "team").filters()[0].name,
        "Mine"
    );

    set.flush(&store).unwrap();
    assert_eq!(
        SavedFilterSet::load(&store, "team").filters()[0].name,
        "Renamed"
    );
}

#[test]
fn keys_map_to_safe_file_names() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    store.set("../escape/attempt", "[]").unwrap();

    let expected = dir.path().join(".._escape_attempt");
    assert_eq!(store.path_for("../escape/attempt"), expected);
    assert!(expected.is_file());
    assert_eq!(store.get("../escape/attempt").unwrap().as_deref(), Some("[]"));
}

#[test]
fn corrupt_file_loads_as_empty() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    std::fs::write(store.path_for(DEFAULT_STORAGE_KEY), "{\"version\": 1, \"filters\": [{").unwrap();

    assert!(load_filters(&store, DEFAULT_STORAGE_KEY).is_empty());
}

#[test]
fn legacy_array_files_still_load() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let legacy = r#"[{
        "id": "abc123",
        "name": "Active",
        "conditions": [{"id": "c1", "field": "status", "operator": "equals", "value": "active"}],
        "createdAt": "2024-01-15T09:30:00.000Z",
        "updatedAt": "2024-01-16T10:00:00.000Z"
    }]"#;
    store.set(DEFAULT_STORAGE_KEY, legacy).unwrap();

    let filters = load_filters(&store, DEFAULT_STORAGE_KEY);
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0].id, "abc123");
    assert!(filters[0].description.is_none());
    assert!(filters[0].updated_at > filters[0].created_at);

    // Rewriting upgrades to the versioned envelope.
    save_filters(&store, DEFAULT_STORAGE_KEY, &filters).unwrap();
    let raw = store.get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    assert!(raw.starts_with("{\"version\":1,"));
}

#[test]
fn remove_deletes_the_file() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path().join("nested").join("store")).unwrap();
    store.set("k", "v").unwrap();
    store.remove("k").unwrap();
    assert!(!store.path_for("k").exists());
    store.remove("k").unwrap();
}

#[test]
fn write_errors_name_the_path_once() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    std::fs::create_dir(store.path_for(DEFAULT_STORAGE_KEY)).unwrap();

    let err = save_filters(&store, DEFAULT_STORAGE_KEY, &[]).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("store I/O error at "));
    assert!(!message.contains("os error"));
    assert!(std::error::Error::source(&err).is_some());
}
