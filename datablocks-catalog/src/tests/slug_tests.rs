use super::*;

// -- slugify --

#[test]
fn test_slugify_basic() {
    assert_eq!(slugify("Parks Properties"), "parks-properties");
    assert_eq!(slugify("311 Service Requests"), "311-service-requests");
}

#[test]
fn test_slugify_strips_punctuation() {
    assert_eq!(slugify("Water & Sewer: Permits (2016)"), "water-sewer-permits-2016");
    assert_eq!(slugify("Bus/Rail Ridership"), "busrail-ridership");
}

#[test]
fn test_slugify_collapses_runs() {
    assert_eq!(slugify("a  -  b---c\t\td"), "a-b-c-d");
}

#[test]
fn test_slugify_keeps_underscores_and_unicode_letters() {
    assert_eq!(slugify("snake_case Name"), "snake_case-name");
    assert_eq!(slugify("Café Inspections"), "café-inspections");
}

#[test]
fn test_slugify_normalizes_compatibility_forms() {
    // Fullwidth letters and the "ﬁ" ligature fold to plain ASCII under NFKC.
    assert_eq!(slugify("ＮＹＣ ﬁle"), "nyc-file");
}

#[test]
fn test_slugify_only_punctuation_is_empty() {
    assert_eq!(slugify("?!*"), "");
}

// -- NameResolver --

#[test]
fn test_distinct_names_get_bare_slugs() {
    let mut r = NameResolver::new();
    assert_eq!(r.resolve("u1", "Trees").slug, "trees");
    assert_eq!(r.resolve("u2", "Bikes").slug, "bikes");
}

#[test]
fn test_same_name_different_uri_is_suffixed() {
    let mut r = NameResolver::new();
    assert_eq!(r.resolve("u1", "Trees").slug, "trees");
    assert_eq!(r.resolve("u2", "Trees").slug, "trees-2");
    assert_eq!(r.resolve("u3", "trees").slug, "trees-3");
}

#[test]
fn test_same_uri_reuses_slug_even_if_renamed() {
    let mut r = NameResolver::new();
    let first = r.resolve("u1", "Trees");
    assert!(first.is_new);
    let again = r.resolve("u1", "Street Trees (renamed)");
    assert_eq!(again.slug, "trees");
    assert!(!again.is_new);
    assert_eq!(r.len(), 1);
}

#[test]
fn test_suffix_skips_slugs_already_in_use() {
    let mut r = NameResolver::new();
    r.resolve("u1", "Trees");
    // A different resource whose own name slugifies to "trees-2".
    r.resolve("u2", "Trees 2");
    let third = r.resolve("u3", "Trees");
    assert_eq!(third.slug, "trees-3");
}

#[test]
fn test_suffixed_slug_collision_with_later_bare_name() {
    let mut r = NameResolver::new();
    r.resolve("u1", "Trees");
    r.resolve("u2", "Trees"); // trees-2
    let third = r.resolve("u3", "Trees-2");
    assert_eq!(third.slug, "trees-2-2");
}

#[test]
fn test_empty_slug_falls_back() {
    let mut r = NameResolver::new();
    assert_eq!(r.resolve("u1", "???").slug, "unnamed");
    assert_eq!(r.resolve("u2", "!!!").slug, "unnamed-2");
}

#[test]
fn test_seeded_resolver_keeps_prior_assignments() {
    let mut seed = BTreeMap::new();
    seed.insert("u1".to_string(), "trees".to_string());
    let mut r = NameResolver::with_assignments(seed);

    assert_eq!(r.resolve("u1", "Something Else").slug, "trees");
    assert_eq!(r.resolve("u2", "Trees").slug, "trees-2");
    assert_eq!(r.assignments().get("u2").map(String::as_str), Some("trees-2"));
}

#[test]
fn test_distinct_uris_never_share_a_slug() {
    let names = ["A", "a", "A!", "a-2", "A", "b", "B ", "a 2"];
    let mut r = NameResolver::new();
    let mut seen = HashSet::new();
    for (i, name) in names.iter().enumerate() {
        let slug = r.resolve(&format!("u{i}"), name).slug;
        assert!(seen.insert(slug.clone()), "duplicate slug {slug}");
    }
    assert_eq!(seen.len(), names.len());
}
