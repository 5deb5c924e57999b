use super::*;
use serde_json::json;

fn socrata_entry() -> Value {
    json!({
        "landing_page": "https://data.cityofnewyork.us/d/kku6-nxdu",
        "resource": "https://data.cityofnewyork.us/api/views/kku6-nxdu/rows.csv?accessType=DOWNLOAD",
        "resource_type": "table",
        "protocol": "https",
        "name": "Demographic Statistics By Zip Code",
        "description": "Demographic statistics broken down by zip code",
        "sources": ["Department of Youth and Community Development (DYCD)"],
        "created": "2011-10-13 19:07:55",
        "last_updated": "2016-02-02 16:23:34",
        "page_views": 18251,
        "column_names": ["JURISDICTION NAME", "COUNT PARTICIPANTS"],
        "topics_provided": ["Social Services"],
        "keywords_provided": ["demographics"],
        "flags": [],
        "rows": 236,
        "columns": 46,
        "available_formats": ["csv", "json"],
        "preferred_format": "csv",
        "preferred_mimetype": "text/csv",
        "dataset": "."
    })
}

// -- Flags --

#[test]
fn test_flags_are_set_like() {
    let mut r = Resource::new("https://example.com/a.csv", "A");
    r.add_flag(Flag::Processed);
    r.add_flag(Flag::Processed);
    r.add_flag(Flag::Error);
    assert_eq!(r.flags, vec![Flag::Processed, Flag::Error]);

    r.remove_flag(Flag::Processed);
    assert!(!r.has_flag(Flag::Processed));
    assert!(r.has_flag(Flag::Error));
}

#[test]
fn test_flag_serializes_lowercase() {
    let s = serde_json::to_string(&vec![Flag::Processed, Flag::Ignore]).unwrap();
    assert_eq!(s, r#"["processed","ignore"]"#);
}

#[test]
fn test_unknown_flag_rejected() {
    let v = json!({"resource": "u", "name": "n", "flags": ["bogus"]});
    assert!(serde_json::from_value::<Resource>(v).is_err());
}

// -- Resource records --

#[test]
fn test_resource_keeps_portal_specific_keys() {
    let v = json!({
        "resource": "https://example.com/a.csv",
        "name": "A",
        "resource_type": "blob",
        "flags": ["processed"]
    });
    let r: Resource = serde_json::from_value(v).unwrap();
    assert_eq!(r.extra.get("resource_type"), Some(&json!("blob")));

    let back = serde_json::to_value(&r).unwrap();
    assert_eq!(back["resource_type"], json!("blob"));
    assert!(back.get("landing_page").is_none());
}

#[test]
fn test_null_fields_read_as_empty() {
    let v = json!({
        "resource": "https://ckan.example.org/dataset/a.csv",
        "name": "A",
        "description": null,
        "sources": null,
        "column_names": null,
        "topics_provided": null,
        "keywords_provided": null,
        "flags": null,
        "landing_page": null
    });
    let r = Resource::from_value(0, v).unwrap();
    assert_eq!(r.description, "");
    assert!(r.sources.is_empty());
    assert!(r.column_names.is_empty());
    assert!(r.topics_provided.is_empty());
    assert!(r.keywords_provided.is_empty());
    assert!(r.flags.is_empty());
    assert_eq!(r.landing_page, None);
    assert!(r.extra.is_empty());
}

#[test]
fn test_glossary_entry_with_null_fields() {
    let mut v = socrata_entry();
    v["description"] = Value::Null;
    v["sources"] = Value::Null;
    let e = GlossaryEntry::from_value(0, v).unwrap();
    assert_eq!(e.record.description, "");
    assert!(e.record.sources.is_empty());
    assert_eq!(e.dataset, ".");
}

#[test]
fn test_display_location_prefers_landing_page() {
    let mut r = Resource::new("https://example.com/a.csv", "A");
    assert_eq!(r.display_location(), "https://example.com/a.csv");
    r.landing_page = Some("https://example.com/d/a".to_string());
    assert_eq!(r.display_location(), "https://example.com/d/a");
}

// -- Glossary entries --

#[test]
fn test_parse_full_glossary_entry() {
    let entry = GlossaryEntry::from_value(0, socrata_entry()).unwrap();
    assert_eq!(entry.name(), "Demographic Statistics By Zip Code");
    assert_eq!(entry.preferred_format.as_deref(), Some("csv"));
    assert_eq!(entry.rows, Some(json!(236)));
    assert!(entry.is_standalone());
    assert!(entry.is_ready());
    assert_eq!(entry.record.extra.get("resource_type"), Some(&json!("table")));
    // Glossary-level keys must not leak into the resource's extras.
    assert!(!entry.record.extra.contains_key("dataset"));
    assert!(!entry.record.extra.contains_key("preferred_format"));
}

#[test]
fn test_glossary_entry_survives_save_and_load() {
    let entry = GlossaryEntry::from_value(0, socrata_entry()).unwrap();
    let text = serde_json::to_string_pretty(&entry).unwrap();
    let again: GlossaryEntry = serde_json::from_str(&text).unwrap();
    assert_eq!(entry, again);
}

#[test]
fn test_missing_dataset_is_schema_error() {
    let mut v = socrata_entry();
    v.as_object_mut().unwrap().remove("dataset");
    let err = GlossaryEntry::from_value(7, v).unwrap_err();
    assert_eq!(
        err,
        SchemaError::MissingField {
            index: 7,
            field: "dataset".to_string()
        }
    );
}

#[test]
fn test_missing_resource_is_schema_error() {
    let mut v = socrata_entry();
    v.as_object_mut().unwrap().remove("resource");
    let err = GlossaryEntry::from_value(2, v).unwrap_err();
    assert!(matches!(err, SchemaError::MissingField { index: 2, ref field } if field == "resource"));
}

#[test]
fn test_empty_resource_is_schema_error() {
    let mut v = socrata_entry();
    v["resource"] = json!("  ");
    assert!(matches!(
        GlossaryEntry::from_value(0, v),
        Err(SchemaError::Invalid { index: 0, .. })
    ));
}

#[test]
fn test_non_object_is_schema_error() {
    assert!(matches!(
        GlossaryEntry::from_value(3, json!(["not", "an", "object"])),
        Err(SchemaError::Invalid { index: 3, .. })
    ));
}

#[test]
fn test_readiness() {
    let mut entry = GlossaryEntry::from_value(0, socrata_entry()).unwrap();
    entry.preferred_format = Some("geojson".to_string());
    assert!(entry.is_ready());

    entry.preferred_format = Some("xls".to_string());
    assert!(!entry.is_ready());

    entry.preferred_format = Some("csv".to_string());
    entry.dataset = "inner/data.csv".to_string();
    assert!(!entry.is_standalone());
    assert!(!entry.is_ready());

    entry.dataset = ".".to_string();
    entry.preferred_format = None;
    assert!(!entry.is_ready());
}

#[test]
fn test_from_resource_strips_processed() {
    let mut r = Resource::new("https://example.com/a.zip", "A");
    r.add_flag(Flag::Processed);
    r.add_flag(Flag::Removed);
    let entry = GlossaryEntry::from_resource(&r, "a/b.csv");
    assert_eq!(entry.record.flags, vec![Flag::Removed]);
    assert_eq!(entry.dataset, "a/b.csv");
}

// -- Filesize --

#[test]
fn test_filesize_timeout_sentinel() {
    let f = Filesize::timed_out(60);
    assert_eq!(f.to_string(), ">60s");
    assert!(f.is_timeout());
    assert!(!Filesize::Text("12345".to_string()).is_timeout());
    assert!(!Filesize::Text(">s".to_string()).is_timeout());
    assert!(!Filesize::kib(1.5).is_timeout());
}

#[test]
fn test_filesize_accepts_number_or_text() {
    let n: Filesize = serde_json::from_value(json!(523.5)).unwrap();
    assert_eq!(n, Filesize::kib(523.5));
    let t: Filesize = serde_json::from_value(json!("4096")).unwrap();
    assert_eq!(t, Filesize::Text("4096".to_string()));
}
