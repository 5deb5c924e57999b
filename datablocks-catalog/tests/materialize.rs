use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use datablocks_catalog::layout::CatalogLayout;
use datablocks_catalog::{CatalogError, init_catalog, init_catalog_entries, store, write_resources};
use datablocks_core::{Filesize, GlossaryEntry, Resource};
use serde_json::{Value, json};
use tempfile::TempDir;

fn entry(uri: &str, name: &str, format: &str, dataset: &str) -> GlossaryEntry {
    GlossaryEntry::from_value(
        0,
        json!({
            "resource": uri,
            "name": name,
            "landing_page": format!("{uri}/about"),
            "sources": ["Parks Department"],
            "flags": [],
            "filesize": 12.0,
            "preferred_format": format,
            "preferred_mimetype": "text/csv",
            "dataset": dataset,
        }),
    )
    .unwrap()
}

fn slugs(dir: &Path) -> Vec<String> {
    CatalogLayout::list_slugs(dir).unwrap()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn one_folder_per_distinct_uri() {
    let tmp = TempDir::new().unwrap();
    let glossary = vec![
        entry("https://p/trees.zip", "Street Trees", "zip", "trees/2015.csv"),
        entry("https://p/trees.zip", "Street Trees", "zip", "trees/2005.csv"),
        entry("https://p/trees.zip", "Street Trees", "zip", "trees/1995.csv"),
        entry("https://p/parks.csv", "Parks", "csv", "."),
        entry("https://p/parks-2.csv", "Parks", "csv", "."),
    ];

    let report = init_catalog_entries(&glossary, tmp.path()).unwrap();

    let uris: BTreeSet<&str> = glossary.iter().map(|e| e.uri()).collect();
    let catalog = slugs(&tmp.path().join("catalog"));
    assert_eq!(catalog.len(), uris.len());
    assert_eq!(catalog, vec!["parks", "parks-2", "street-trees"]);
    assert_eq!(slugs(&tmp.path().join("tasks")), catalog);
    assert_eq!(report.entries, 5);
    assert_eq!(report.created.len(), 3);
}

#[test]
fn doubled_name_gets_suffixed_slug() {
    let tmp = TempDir::new().unwrap();
    let glossary = vec![
        entry("https://p/a.csv", "Bike Counts", "csv", "."),
        entry("https://p/b.csv", "Bike Counts", "csv", "."),
    ];

    let report = init_catalog_entries(&glossary, tmp.path()).unwrap();
    assert_eq!(report.created, vec!["bike-counts", "bike-counts-2"]);

    let root = fs::canonicalize(tmp.path()).unwrap();
    let depositor = fs::read_to_string(root.join("tasks/bike-counts-2/depositor.py")).unwrap();
    assert!(depositor.contains("https://p/b.csv"));
    let expected = root.join("catalog/bike-counts-2/data.csv");
    assert_eq!(
        depositor.lines().last().unwrap(),
        format!("outputs = [\"{}\"]", expected.display())
    );
}

#[test]
fn archive_gets_zip_depositor_and_member_listing_stub() {
    let tmp = TempDir::new().unwrap();
    let glossary = vec![
        entry("https://p/trees.zip", "Street Trees", "zip", "2015.csv"),
        entry("https://p/trees.zip", "Street Trees", "zip", "2005.csv"),
    ];

    let report = init_catalog_entries(&glossary, tmp.path()).unwrap();
    assert_eq!(report.transforms, vec!["street-trees"]);

    let root = fs::canonicalize(tmp.path()).unwrap();
    let sidecar = read_json(&root.join("tasks/street-trees/depositor.outputs.json"));
    let data = root.join("catalog/street-trees/data.zip");
    assert_eq!(sidecar, json!([data.to_string_lossy()]));

    let transform = fs::read_to_string(root.join("tasks/street-trees/transform.py")).unwrap();
    assert!(transform.starts_with("# TODO"));
    assert!(transform.contains("ZipFile"));
    assert!(transform.contains("2015.csv") && transform.contains("2005.csv"));

    let manifest = read_json(&root.join("catalog/street-trees/datapackage.json"));
    assert_eq!(manifest["complete"], json!(false));
    assert_eq!(manifest["resources"], json!([]));
}

#[test]
fn manifest_completeness_follows_format() {
    let tmp = TempDir::new().unwrap();
    let glossary = vec![
        entry("https://p/a.csv", "Ready Table", "csv", "."),
        entry("https://p/b.xls", "Spreadsheet", "xls", "."),
    ];

    let report = init_catalog_entries(&glossary, tmp.path()).unwrap();
    assert_eq!(report.transforms, vec!["spreadsheet"]);

    let ready = read_json(&tmp.path().join("catalog/ready-table/datapackage.json"));
    assert_eq!(ready["complete"], json!(true));
    assert_eq!(
        ready["resources"],
        json!([{"path": "data.csv", "url": "https://p/a.csv"}])
    );
    assert!(!tmp.path().join("tasks/ready-table/transform.py").exists());

    let pending = read_json(&tmp.path().join("catalog/spreadsheet/datapackage.json"));
    assert_eq!(pending["complete"], json!(false));
    assert_eq!(pending["resources"], json!([]));
    let stub = fs::read_to_string(tmp.path().join("tasks/spreadsheet/transform.py")).unwrap();
    assert!(stub.contains("data.xls"));
}

#[test]
fn second_run_creates_nothing_new() {
    let tmp = TempDir::new().unwrap();
    let glossary = vec![
        entry("https://p/a.csv", "Alpha", "csv", "."),
        entry("https://p/b.csv", "Alpha", "csv", "."),
        entry("https://p/c.zip", "Gamma", "zip", "x.shp"),
    ];
    let resources: Vec<Resource> = glossary.iter().map(|e| e.record.clone()).collect();
    let resource_file = tmp.path().join("resources.json");

    write_resources(&resources, &resource_file).unwrap();
    let first = init_catalog_entries(&glossary, tmp.path()).unwrap();
    let listing = slugs(&tmp.path().join("catalog"));

    assert_eq!(write_resources(&resources, &resource_file).unwrap(), 0);
    let second = init_catalog_entries(&glossary, tmp.path()).unwrap();

    assert_eq!(first.created.len(), 3);
    assert!(second.created.is_empty());
    assert_eq!(second.skipped, first.created);
    assert_eq!(slugs(&tmp.path().join("catalog")), listing);
    assert_eq!(store::load_resources(&resource_file).unwrap().len(), 3);
}

#[test]
fn renamed_resource_keeps_its_folder() {
    let tmp = TempDir::new().unwrap();
    init_catalog_entries(&[entry("https://p/a.csv", "Old Title", "csv", ".")], tmp.path()).unwrap();

    let report = init_catalog_entries(
        &[
            entry("https://p/a.csv", "New Title", "csv", "."),
            entry("https://p/b.csv", "Old Title", "csv", "."),
        ],
        tmp.path(),
    )
    .unwrap();

    assert_eq!(report.skipped, vec!["old-title"]);
    assert_eq!(report.created, vec!["old-title-2"]);
    let index = read_json(&tmp.path().join(".catalog-index.json"));
    assert_eq!(index["https://p/a.csv"], json!("old-title"));
    assert_eq!(index["https://p/b.csv"], json!("old-title-2"));
}

#[test]
fn malformed_glossary_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let glossary_path = tmp.path().join("glossary.json");
    let raw = json!([
        {"resource": "https://p/a.csv", "name": "A", "dataset": ".", "preferred_format": "csv"},
        {"resource": "https://p/b.csv", "name": "B"},
    ]);
    fs::write(&glossary_path, raw.to_string()).unwrap();
    let root = tmp.path().join("root");

    let err = init_catalog(&glossary_path, &root).unwrap_err();
    match err {
        CatalogError::Schema(e) => assert_eq!(e.index(), 1),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!root.join("catalog").exists());
    assert!(!root.join("tasks").exists());
}

#[test]
fn missing_glossary_is_reported() {
    let tmp = TempDir::new().unwrap();
    let err = init_catalog(&tmp.path().join("nope.json"), tmp.path()).unwrap_err();
    assert!(matches!(err, CatalogError::Store(_)));
}

#[test]
fn empty_glossary_creates_empty_tree() {
    let tmp = TempDir::new().unwrap();
    let report = init_catalog_entries(&[], tmp.path()).unwrap();
    assert!(report.created.is_empty());
    assert!(tmp.path().join("catalog").is_dir());
    assert!(tmp.path().join("tasks").is_dir());
}

#[test]
fn failed_write_removes_folders_from_this_run() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("tasks")).unwrap();
    // A stray file where the second task folder should go.
    fs::write(tmp.path().join("tasks").join("beta"), "in the way").unwrap();

    let glossary = vec![
        entry("https://p/a.csv", "Alpha", "csv", "."),
        entry("https://p/b.csv", "Beta", "csv", "."),
    ];
    let err = init_catalog_entries(&glossary, tmp.path()).unwrap_err();
    assert!(matches!(err, CatalogError::Io { .. }));

    assert!(!tmp.path().join("catalog").join("alpha").exists());
    assert!(!tmp.path().join("tasks").join("alpha").exists());
    assert!(!tmp.path().join("catalog").join("beta").exists());
    assert!(tmp.path().join("tasks").join("beta").is_file());
    assert!(!tmp.path().join(".catalog-index.json").exists());
}

#[test]
fn timed_out_sizes_are_counted() {
    let tmp = TempDir::new().unwrap();
    let mut slow = entry("https://p/slow.csv", "Slow", "csv", ".");
    slow.filesize = Some(Filesize::timed_out(60));
    let glossary = vec![slow, entry("https://p/fast.csv", "Fast", "csv", ".")];

    let report = init_catalog_entries(&glossary, tmp.path()).unwrap();
    assert_eq!(report.r#unsized, 1);
    assert_eq!(report.created.len(), 2);
}
