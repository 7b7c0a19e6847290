use tempfile::tempdir;

use tdviewer::query::FieldQuery;
use tdviewer::store::{preset_color, PresetDraft, PresetStore, PresetUpdate, ValueColor, ValueColorStore};
use tdviewer::table::PresetColumn;
use tdviewer::Error;

fn draft(name: &str) -> PresetDraft {
    let mut draft = PresetDraft::new(
        name,
        vec![PresetColumn::new("name", true), PresetColumn::new("age", false)],
    );
    draft
        .field_queries
        .insert("name".to_string(), FieldQuery::new("ali"));
    draft
}

#[test]
fn test_preset_store_persists_to_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("presets.json");

    let mut store = PresetStore::load_from_file(&path).unwrap();
    assert!(store.is_empty());

    let saved = store.save(draft("people"));
    assert!(saved.id.starts_with("preset-"));
    store.save_to_file(&path).unwrap();

    let loaded = PresetStore::load_from_file(&path).unwrap();
    let preset = loaded.find_by_name("people").unwrap();
    assert_eq!(preset.id, saved.id);
    assert_eq!(preset.columns, saved.columns);
    assert_eq!(preset.field_queries["name"].query, "ali");
    assert_eq!(preset.js_query, "$");
}

#[test]
fn test_preset_update_duplicate_delete() {
    let mut store = PresetStore::new();
    let original = store.save(draft("one"));

    let updated = store
        .update(
            &original.id,
            PresetUpdate {
                name: Some("renamed".to_string()),
                js_query: Some("$.age > 1".to_string()),
                ..PresetUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "renamed");
    assert_eq!(updated.columns, original.columns);
    assert!(updated.updated_at >= original.updated_at);

    let copy = store.duplicate(&original.id, "copy").unwrap();
    assert_ne!(copy.id, original.id);
    assert_eq!(copy.js_query, "$.age > 1");
    assert_eq!(store.len(), 2);

    assert!(store.delete(&original.id));
    assert!(!store.delete(&original.id));
    assert!(matches!(
        store.update(&original.id, PresetUpdate::default()),
        Err(Error::PresetNotFound(_))
    ));
}

#[test]
fn test_preset_export_and_import() {
    let mut store = PresetStore::new();
    let original = store.save(draft("shared"));
    let exported = PresetStore::export_preset(&original).unwrap();

    let imported = store.import_preset(&exported).unwrap();
    assert_ne!(imported.id, original.id);
    assert_eq!(imported.name, "shared");
    assert_eq!(imported.field_queries, original.field_queries);

    let minimal = store
        .import_preset(r#"{"name": "min", "columns": []}"#)
        .unwrap();
    assert_eq!(minimal.js_query, "$");

    for bad in [r#"{"columns": []}"#, r#"{"name": "", "columns": []}"#, r#"{"name": "x"}"#] {
        assert!(matches!(store.import_preset(bad), Err(Error::InvalidPreset(_))));
    }
    assert!(store.import_preset("not json").is_err());
}

#[test]
fn test_value_colors_persist_and_sync_with_queries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("colors.json");

    let mut colors = ValueColorStore::new();
    let yellow = preset_color("yellow").unwrap().to_color();
    colors.set("status", "error", Some(yellow.clone()));
    colors.set("status", "ok", Some(ValueColor::new("#bbf7d0", "#14532d")));
    colors.save_to_file(&path).unwrap();

    let mut loaded = ValueColorStore::load_from_file(&path).unwrap();
    assert_eq!(loaded.get("status", "error"), Some(&yellow));
    assert_eq!(
        loaded.style_for("status", "ok"),
        Some(("#bbf7d0".to_string(), "#14532d".to_string()))
    );

    // clearing the last color of a field removes the field
    loaded.set("status", "error", None);
    loaded.set("status", "ok", Some(ValueColor::new("", "")));
    assert!(loaded.is_empty());

    let mut fqs = indexmap::IndexMap::new();
    fqs.insert("status".to_string(), FieldQuery::default());
    colors.store_into_field_queries(&mut fqs);
    assert_eq!(fqs["status"].value_colors.as_ref().unwrap().len(), 2);

    let mut restored = ValueColorStore::new();
    restored.apply_from_field_queries(&fqs);
    assert_eq!(restored, colors);
}

#[test]
fn test_unreadable_color_file_gives_empty_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("colors.json");
    std::fs::write(&path, "{broken").unwrap();
    assert!(ValueColorStore::load_from_file(&path).unwrap().is_empty());
}
