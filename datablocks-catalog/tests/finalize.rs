use std::fs;

use datablocks_catalog::layout::CatalogLayout;
use datablocks_catalog::{finalize, init_catalog_entries};
use datablocks_core::GlossaryEntry;
use serde_json::{Value, json};
use tempfile::TempDir;

fn entry(uri: &str, name: &str, format: &str, dataset: &str) -> GlossaryEntry {
    GlossaryEntry::from_value(
        0,
        json!({
            "resource": uri,
            "name": name,
            "preferred_format": format,
            "dataset": dataset,
        }),
    )
    .unwrap()
}

#[test]
fn incomplete_entries_are_removed_from_both_sides() {
    let tmp = TempDir::new().unwrap();
    let glossary = vec![
        entry("https://p/a.csv", "Complete One", "csv", "."),
        entry("https://p/b.xls", "Needs Work", "xls", "."),
        entry("https://p/c.zip", "Archive", "zip", "inner.csv"),
        entry("https://p/d.geojson", "Shapes", "geojson", "."),
    ];
    init_catalog_entries(&glossary, tmp.path()).unwrap();

    let report = finalize(tmp.path()).unwrap();
    assert_eq!(report.kept, vec!["complete-one", "shapes"]);
    assert_eq!(report.removed, vec!["archive", "needs-work"]);
    assert!(report.unreadable.is_empty());

    let catalog = CatalogLayout::list_slugs(&tmp.path().join("catalog")).unwrap();
    let tasks = CatalogLayout::list_slugs(&tmp.path().join("tasks")).unwrap();
    assert_eq!(catalog, tasks);
    for slug in &catalog {
        let manifest: Value = serde_json::from_str(
            &fs::read_to_string(tmp.path().join("catalog").join(slug).join("datapackage.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest["complete"], json!(true));
    }
}

#[test]
fn finalizing_twice_is_stable() {
    let tmp = TempDir::new().unwrap();
    init_catalog_entries(
        &[
            entry("https://p/a.csv", "A", "csv", "."),
            entry("https://p/b.xls", "B", "xls", "."),
        ],
        tmp.path(),
    )
    .unwrap();

    finalize(tmp.path()).unwrap();
    let again = finalize(tmp.path()).unwrap();
    assert!(again.removed.is_empty());
    assert_eq!(again.kept, vec!["a"]);
}

#[test]
fn unreadable_manifest_is_left_in_place() {
    let tmp = TempDir::new().unwrap();
    let broken = tmp.path().join("catalog/broken");
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join("datapackage.json"), "{ not json").unwrap();
    fs::create_dir_all(tmp.path().join("catalog/bare")).unwrap();

    let report = finalize(tmp.path()).unwrap();
    let slugs: Vec<&str> = report.unreadable.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(slugs, vec!["bare", "broken"]);
    assert!(broken.is_dir());
    assert!(tmp.path().join("catalog/bare").is_dir());
}

#[test]
fn missing_catalog_is_empty_report() {
    let tmp = TempDir::new().unwrap();
    let report = finalize(tmp.path()).unwrap();
    assert!(report.kept.is_empty() && report.removed.is_empty());
}
