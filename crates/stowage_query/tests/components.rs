//! Capability filters over a generated and round-tripped catalog.

mod common;

use common::{engine, prefab_manifest};
use stowage_catalog::{AssetLoader, AssetLoaderExt, AssetShape, CatalogEntry, StaticLoader};

fn names(entries: &[CatalogEntry]) -> Vec<&str> {
    entries.iter().map(CatalogEntry::name).collect()
}

#[test]
fn with_all_multiple_components() {
    let engine = engine();
    let manifest = prefab_manifest(&engine);
    let mut query = manifest.query().with_all_components([
        engine.camera.clone(),
        engine.audio.clone(),
        engine.light.clone(),
    ]);
    assert_eq!(query.get_result().map(CatalogEntry::name), Some("CameraAudioLight"));
}

#[test]
fn with_some_multiple_components() {
    let engine = engine();
    let manifest = prefab_manifest(&engine);
    let mut query = manifest
        .query()
        .with_some_components([engine.audio.clone(), engine.light.clone()]);
    let results = query.get_results();
    assert_eq!(results.len(), 3);
    assert!(!names(results).contains(&"Camera"));
}

#[test]
fn without_any_multiple_components() {
    let engine = engine();
    let manifest = prefab_manifest(&engine);
    let mut query = manifest
        .query()
        .without_any_components([engine.audio.clone(), engine.light.clone()]);
    assert_eq!(names(query.get_results()), vec!["Camera", "readme"]);
}

#[test]
fn without_all_multiple_components() {
    let engine = engine();
    let manifest = prefab_manifest(&engine);
    let mut query = manifest.query().without_all_components([
        engine.audio.clone(),
        engine.light.clone(),
        engine.camera.clone(),
        engine.transform.clone(),
    ]);
    let results = query.get_results();
    assert_eq!(results.len(), 4);
    assert!(!names(results).contains(&"CameraAudioLight"));
}

#[test]
fn with_and_without_components_combine() {
    let engine = engine();
    let manifest = prefab_manifest(&engine);
    let mut query = manifest
        .query()
        .with_all_components([engine.light.clone()])
        .without_any_components([engine.audio.clone(), engine.camera.clone(), engine.text.clone()]);
    assert_eq!(names(query.get_results()), vec!["Light"]);
}

#[test]
fn typed_results_follow_the_hierarchy() {
    let engine = engine();
    let manifest = prefab_manifest(&engine);
    let behaviour = engine.registry.get("engine::Behaviour").unwrap();

    let mut query = manifest.query().in_package(false);
    assert_eq!(query.get_results_of(&behaviour).len(), 4);

    let mut query = manifest.query().in_package(true);
    assert!(query.get_result_of(&behaviour).is_none());
}

#[test]
fn packaged_entries_resolve_through_package_filters() {
    let engine = engine();
    let manifest = prefab_manifest(&engine);
    let mut query = manifest.query().by_package("com.acme.docs").by_path("notes");
    let entry = query.get_result().expect("readme is packaged");
    assert_eq!(entry.logical_path(), "notes/readme");
    assert!(entry.has_capability(&engine.text));
}

#[tokio::test]
async fn query_results_load_through_the_loader() {
    let engine = engine();
    let manifest = prefab_manifest(&engine);
    let loader = StaticLoader::new().with_asset(
        "Light",
        AssetShape::Composite(vec![engine.transform.clone(), engine.light.clone()]),
    );

    let mut query = manifest.query().by_name("Light");
    let entry = query.get_result().cloned().expect("light prefab");

    let loaded = loader.load_entry_async(&entry, Some(&engine.light)).await.unwrap();
    assert!(loaded.is_some());
    for capability in entry.capabilities() {
        assert!(loader.load_entry(&entry, Some(capability)).unwrap().is_some());
    }
    assert!(loader.load(entry.logical_path(), Some(&engine.camera)).unwrap().is_none());
}
