//! End-to-end scenarios through the Archive facade
//!
//! These follow a CSAR from unpacking, through settings resolution and
//! dependency edits, to the repacked archive on disk.

use std::collections::BTreeMap;

use csar_core::Archive;
use csar_meta::{FixedValues, Manifest, PersistedPolicy, Slot};
use csar_test_utils::{TestCsar, read_entries, read_entry};
use csar_tosca::ServiceTemplate;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn manifest_names(archive: &std::path::Path) -> Vec<String> {
    let text = read_entry(archive, "TOSCA-Metadata/TOSCA.meta").unwrap();
    Manifest::parse(&text, archive)
        .unwrap()
        .entries()
        .iter()
        .map(|e| e.path.to_string())
        .collect()
}

/// Unpack app.csar, answer the architecture prompt with a blank line,
/// add install.sh -> nginx and repack to app2.csar.
#[test]
fn scenario_script_dependency_roundtrip() {
    let (dir, app) = TestCsar::sample().write_temp("app.csar");
    let mut provider = FixedValues::new();

    let mut archive = Archive::open(&app, &mut provider).unwrap();
    assert_eq!(provider.asked(), &[Slot::Architecture, Slot::Policy]);
    assert_eq!(archive.architecture().as_stored(), "i386");
    assert_eq!(archive.policy(), PersistedPolicy::Addition);

    let edge = archive.add_script_dependency("install.sh", "nginx").unwrap();
    let app2 = dir.path().join("app2.csar");
    archive.pack(&app2).unwrap();
    archive.discard().unwrap();

    assert_eq!(edge.source, "install.sh");
    assert_eq!(edge.target, "nginx");

    let names = manifest_names(&app2);
    for original in ["Definitions/app.tosca", "Scripts/install.sh"] {
        assert!(names.contains(&original.to_string()));
    }
    assert!(names.contains(&"Definitions/RR_DependsOn.tosca".to_string()));

    let template = read_entry(&app2, "Definitions/app.tosca").unwrap();
    let parsed = ServiceTemplate::parse(template, std::path::Path::new("app.tosca")).unwrap();
    let pairs: Vec<_> = parsed
        .edges()
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(pairs, vec![("install.sh", "nginx")]);

    // The input archive is untouched
    assert_eq!(read_entries(&app), read_entries(&TestCsar::sample().write_temp("ref.csar").1));
}

/// A second run over the repacked archive reads the stored settings and
/// keeps adding to the same template.
#[test]
fn scenario_settings_survive_repack() {
    let (dir, app) = TestCsar::sample().write_temp("app.csar");
    let app2 = dir.path().join("app2.csar");

    let mut first = Archive::open(&app, &mut FixedValues::new().architecture("amd64").policy("1")).unwrap();
    first.add_script_dependency("install.sh", "nginx").unwrap();
    first.pack(&app2).unwrap();
    first.discard().unwrap();

    let mut provider = FixedValues::new();
    let mut second = Archive::open(&app2, &mut provider).unwrap();
    second.add_script_dependency("install.sh", "apache2").unwrap();

    assert!(provider.asked().is_empty());
    assert_eq!(second.architecture().as_stored(), ":amd64");
    assert_eq!(second.policy(), PersistedPolicy::Expanding);
    let edges = second.edges().unwrap();
    assert_eq!(edges.len(), 1);
    insta::assert_snapshot!(edges[0].target, @"apache2_amd64");
}

/// Unpack then repack with no edits reproduces entry set and contents.
#[test]
fn scenario_repack_is_equivalent() {
    let seeded = TestCsar::sample()
        .with_file(
            "TOSCA-Metadata/TOSCA.meta",
            format!(
                "{}\nName: References_Resolver/arch\nContent-Type: text/txt\n\nName: References_Resolver/resolv\nContent-Type: text/txt\n",
                csar_test_utils::fixtures::TOSCA_META
            ),
        )
        .with_file("References_Resolver/arch", "")
        .with_file("References_Resolver/resolv", "ADDITION");
    let dir = TempDir::new().unwrap();
    let original = dir.path().join("app.csar");
    seeded.write_to(&original);

    // An empty arch file counts as unconfigured, so answer it with noarch
    let archive = Archive::open(&original, &mut FixedValues::new().architecture("noarch")).unwrap();
    let copy = dir.path().join("copy.csar");
    archive.pack(&copy).unwrap();

    let before: BTreeMap<_, _> = read_entries(&original);
    let after: BTreeMap<_, _> = read_entries(&copy);
    assert_eq!(after, before);
}
