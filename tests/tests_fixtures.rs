//! Fixture sweep - properties that hold for every XML fixture.

use std::path::Path;

use nsmigrate::namespace::{
    NamespaceUsage, TargetNamespace, find_usages, find_usages_par, known, migrate_par,
    replace_usages,
};
use once_cell::sync::Lazy;
use walkdir::WalkDir;

struct Fixture {
    name: String,
    text: String,
}

static FIXTURES: Lazy<Vec<Fixture>> = Lazy::new(|| {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut fixtures: Vec<Fixture> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            matches!(
                entry.path().extension().and_then(|ext| ext.to_str()),
                Some("xml" | "bpmn")
            )
        })
        .map(|entry| Fixture {
            name: entry.file_name().to_string_lossy().into_owned(),
            text: std::fs::read_to_string(entry.path()).expect("fixture should be readable"),
        })
        .collect();
    fixtures.sort_by(|a, b| a.name.cmp(&b.name));
    fixtures
});

#[test]
fn test_fixtures_are_present() {
    assert!(FIXTURES.len() >= 9, "found {} fixtures", FIXTURES.len());
}

#[test]
fn test_every_fixture_is_readable() {
    for fixture in FIXTURES.iter() {
        assert!(
            nsmigrate::try_find_usages(&fixture.text, known::CAMUNDA).is_ok(),
            "{} should be well-formed",
            fixture.name
        );
    }
}

#[test]
fn test_rewrite_to_sole_prefix_is_identity() {
    for fixture in FIXTURES.iter() {
        let Some(used) = find_usages(&fixture.text, known::CAMUNDA) else {
            continue;
        };
        if used.prefixes.len() > 1 {
            continue;
        }
        let prefix = used.prefixes.first().cloned().unwrap_or_default();
        let target = TargetNamespace {
            prefix,
            uri: used.uri.clone(),
        };
        assert_eq!(
            replace_usages(&fixture.text, &used, &target),
            fixture.text,
            "{} should be unchanged",
            fixture.name
        );
    }
}

#[test]
fn test_detected_prefixes_resolve_to_uri() {
    for fixture in FIXTURES.iter() {
        let Some(NamespaceUsage { prefixes, .. }) = find_usages(&fixture.text, known::CAMUNDA)
        else {
            continue;
        };
        for prefix in &prefixes {
            let declaration = format!(r#"xmlns:{prefix}="{}""#, known::CAMUNDA);
            assert!(
                fixture.text.contains(&declaration),
                "{}: `{prefix}` should be declared for the namespace",
                fixture.name
            );
        }
    }
}

#[test]
fn test_parallel_batch_matches_sequential() {
    let texts: Vec<&str> = FIXTURES.iter().map(|f| f.text.as_str()).collect();

    let sequential: Vec<_> = texts
        .iter()
        .map(|text| find_usages(text, known::CAMUNDA))
        .collect();
    assert_eq!(find_usages_par(&texts, known::CAMUNDA), sequential);

    let migrated = migrate_par(&texts, known::CAMUNDA, &TargetNamespace::activiti());
    for ((fixture, usage), result) in FIXTURES.iter().zip(&sequential).zip(&migrated) {
        assert_eq!(usage.is_some(), result.is_some(), "{}", fixture.name);
    }
}
