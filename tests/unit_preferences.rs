use avp_remote::storage::preferences::{LocalPreferences, PreferencesStore, DEFAULT_PREVIEW_VOLUME};

#[test]
fn save_and_load_preferences() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("nested/preferences.json");
    let store = PreferencesStore::new(&path);

    store
        .save(&LocalPreferences { preview_volume: 35 })
        .expect("save preferences");
    let loaded = store.load().expect("load preferences");
    assert_eq!(loaded.preview_volume, 35);

    let raw = std::fs::read_to_string(&path).expect("read raw file");
    assert!(raw.contains("\"preview.volume\": 35"));
}

#[test]
fn missing_file_uses_default_volume() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = PreferencesStore::new(dir.path().join("preferences.json"));
    assert_eq!(
        store.load().expect("load defaults").preview_volume,
        DEFAULT_PREVIEW_VOLUME
    );
}

#[test]
fn out_of_range_volume_is_clamped() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("preferences.json");
    std::fs::write(&path, r#"{ "preview.volume": 300 }"#).expect("write file");

    let loaded = PreferencesStore::new(&path).load().expect("load");
    assert_eq!(loaded.preview_volume, 100);
}

#[test]
fn corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("preferences.json");
    std::fs::write(&path, "not json").expect("write file");

    let err = PreferencesStore::new(&path)
        .load()
        .expect_err("corrupt file should fail");
    assert!(err.to_string().contains("failed to parse preferences file"));
}
