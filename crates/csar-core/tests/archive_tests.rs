//! End-to-end behavior of the Archive facade

use std::fs;

use csar_archive::ArchiveWorkspace;
use csar_core::{Archive, ArchiveOptions, DirectoryFetcher, Error};
use csar_meta::{FailFast, FixedValues, PersistedPolicy, ResolutionPolicy};
use csar_test_utils::{TestCsar, fixtures, read_entries, read_entry};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

fn open_sample() -> (TempDir, Archive) {
    let (dir, path) = TestCsar::sample().write_temp("app.csar");
    let archive = Archive::open(&path, &mut FixedValues::new()).unwrap();
    (dir, archive)
}

#[test]
fn test_blank_answers_select_defaults() {
    let (_dir, archive) = open_sample();

    assert_eq!(archive.architecture().as_stored(), "i386");
    assert_eq!(archive.policy(), PersistedPolicy::Addition);
    let files: Vec<_> = archive.files().iter().map(|f| f.as_str()).collect();
    assert_eq!(
        files,
        ["TOSCA-Metadata/TOSCA.meta", "Definitions/app.tosca", "Scripts/install.sh"]
    );
}

#[test]
fn test_script_dependency_and_repack() {
    let (dir, mut archive) = open_sample();

    let edge = archive.add_script_dependency("install.sh", "nginx").unwrap();
    let target = dir.path().join("app2.csar");
    archive.pack(&target).unwrap();

    assert_eq!((edge.source.as_str(), edge.target.as_str()), ("install.sh", "nginx"));

    let meta = read_entry(&target, "TOSCA-Metadata/TOSCA.meta").unwrap();
    for name in [
        "Definitions/app.tosca",
        "Scripts/install.sh",
        "References_Resolver/arch",
        "References_Resolver/resolv",
        "Definitions/RR_DependsOn.tosca",
    ] {
        assert!(meta.contains(&format!("Name: {name}\n")), "{name} not registered");
    }

    let template = read_entry(&target, "Definitions/app.tosca").unwrap();
    assert!(template.contains("<SourceElement ref=\"install.sh\"/>"));
    assert!(template.contains("<TargetElement ref=\"nginx\"/>"));
    assert!(read_entry(&target, "Definitions/RR_DependsOn.tosca").is_some());
}

#[test]
fn test_repack_without_changes_is_equivalent() {
    let meta = format!(
        "{}\nName: References_Resolver/arch\nContent-Type: text/txt\n\nName: References_Resolver/resolv\nContent-Type: text/txt\n",
        fixtures::TOSCA_META
    );
    let csar = TestCsar::sample()
        .with_file("TOSCA-Metadata/TOSCA.meta", meta)
        .with_file("References_Resolver/arch", ":amd64")
        .with_file("References_Resolver/resolv", "EXPANDING");
    let (dir, path) = csar.write_temp("app.csar");

    let mut provider = FixedValues::new();
    let archive = Archive::open(&path, &mut provider).unwrap();
    let target = dir.path().join("copy.csar");
    archive.pack(&target).unwrap();

    assert!(provider.asked().is_empty());
    assert_eq!(read_entries(&target), read_entries(&path));
}

#[test]
fn test_expanding_keeps_one_edge_per_source() {
    let (_dir, mut archive) = open_sample();
    archive.set_policy(ResolutionPolicy::Expanding).unwrap();

    archive.add_package_dependency("install.sh", "nginx_amd64").unwrap();
    archive.add_package_dependency("install.sh", "apache2_amd64").unwrap();

    let edges = archive.edges().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].target, "apache2_amd64");
}

#[test]
fn test_undefined_policy_is_rejected() {
    let (_dir, mut archive) = open_sample();

    let result = archive.set_policy(ResolutionPolicy::Undefined);

    assert!(matches!(
        result,
        Err(Error::Meta(csar_meta::Error::InvalidPolicySelection { .. }))
    ));
    assert_eq!(archive.policy(), PersistedPolicy::Addition);
}

#[test]
fn test_architecture_input_rules() {
    let (_dir, mut archive) = open_sample();

    archive.set_architecture_input("noarch").unwrap();
    assert!(archive.architecture().is_noarch());

    archive.set_architecture_input("arm").unwrap();
    assert_eq!(archive.architecture().as_stored(), ":arm");
}

#[test]
fn test_fetch_package_registers_artifact() {
    let packages = TempDir::new().unwrap();
    fs::write(packages.path().join("nginx_amd64.deb"), "deb").unwrap();
    let (dir, path) = TestCsar::sample().write_temp("app.csar");
    let mut archive = Archive::open(&path, &mut FixedValues::new().architecture("amd64")).unwrap();

    let fetched = archive
        .fetch_package("nginx", &mut DirectoryFetcher::new(packages.path()))
        .unwrap();
    archive.add_script_dependency("install.sh", "nginx").unwrap();

    assert_eq!(fetched.reference, "nginx_amd64");
    let entry = archive.manifest().get(&fetched.artifact).unwrap();
    assert_eq!(entry.media_type, "application/vnd.debian.binary-package");
    assert!(archive.audit().unwrap().is_clean());

    let target = dir.path().join("out.csar");
    archive.pack(&target).unwrap();
    assert_eq!(
        read_entry(&target, "Content/Packages/nginx_amd64.deb").as_deref(),
        Some("deb")
    );
}

#[test]
fn test_fetch_failure_is_propagated() {
    let packages = TempDir::new().unwrap();
    let (_dir, mut archive) = open_sample();

    let result = archive.fetch_package("nginx", &mut DirectoryFetcher::new(packages.path()));

    assert!(matches!(result, Err(Error::Fetch(_))));
}

#[test]
fn test_audit_reports_stray_files() {
    let (_dir, archive) = open_sample();
    assert!(archive.audit().unwrap().is_clean());

    fs::write(archive.workspace_dir().join("notes.txt"), "x").unwrap();
    fs::remove_file(archive.workspace_dir().join("Scripts/install.sh")).unwrap();

    let audit = archive.audit().unwrap();
    assert_eq!(audit.unregistered.len(), 1);
    assert_eq!(audit.unregistered[0].as_str(), "notes.txt");
    assert_eq!(audit.missing[0].as_str(), "Scripts/install.sh");
}

#[test]
fn test_summary_serializes() {
    let (_dir, mut archive) = open_sample();
    archive.add_script_dependency("install.sh", "nginx").unwrap();

    let summary = serde_json::to_value(archive.summary().unwrap()).unwrap();

    assert_eq!(summary["architecture"], "i386");
    assert_eq!(summary["policy"], "ADDITION");
    assert_eq!(summary["edges"][0]["target"], "nginx");
    assert_eq!(summary["files"][1], "Definitions/app.tosca");
}

#[test]
fn test_summary_without_template_has_no_edges() {
    let (_dir, path) = TestCsar::sample()
        .without_file("Definitions/app.tosca")
        .write_temp("app.csar");
    let mut archive = Archive::open(&path, &mut FixedValues::new()).unwrap();

    assert!(archive.summary().unwrap().edges.is_empty());
}

#[rstest]
#[case("")]
#[case("/")]
fn test_pack_rejects_empty_target(#[case] target: &str) {
    let (_dir, archive) = open_sample();

    let result = archive.pack(target);

    assert!(matches!(
        result,
        Err(Error::Archive(csar_archive::Error::InvalidTarget))
    ));
}

#[test]
fn test_custom_workspace_and_discard() {
    let (dir, path) = TestCsar::sample().write_temp("app.csar");
    let workspace = dir.path().join("work");
    let options = ArchiveOptions {
        workspace_dir: Some(workspace.clone()),
        ..Default::default()
    };

    let archive = Archive::open_with(&path, options, &mut FixedValues::new()).unwrap();
    assert_eq!(archive.workspace_dir(), workspace);
    assert!(!ArchiveWorkspace::default_dir_for(&path).exists());

    archive.discard().unwrap();
    assert!(!workspace.exists());
}

#[test]
fn test_failed_open_removes_workspace() {
    let (dir, path) = TestCsar::sample().write_temp("app.csar");

    let result = Archive::open(&path, &mut FailFast);

    assert!(matches!(
        result,
        Err(Error::Meta(csar_meta::Error::PromptFailed { .. }))
    ));
    assert!(!ArchiveWorkspace::default_dir_for(&path).exists());
    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["app.csar"]);
}

#[test]
fn test_missing_archive() {
    let dir = TempDir::new().unwrap();

    let result = Archive::open(dir.path().join("absent.csar"), &mut FixedValues::new());

    assert!(matches!(
        result,
        Err(Error::Archive(csar_archive::Error::ArchiveNotFound { .. }))
    ));
}
