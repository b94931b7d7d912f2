//! The layer 0 crates composed by hand, without the Archive facade

use csar_archive::ArchiveWorkspace;
use csar_fs::NormalizedPath;
use csar_meta::{FixedValues, Manifest, ResolutionStore, StoreConfig};
use csar_test_utils::{TestCsar, fixtures, read_entry};
use csar_tosca::{DependencyMutator, descriptor};
use pretty_assertions::assert_eq;

#[test]
fn manual_pipeline_matches_facade_order() {
    let (dir, app) = TestCsar::sample().write_temp("app.csar");
    let workspace = ArchiveWorkspace::open(&app).unwrap();

    let mut manifest = Manifest::init(workspace.dir()).unwrap();
    let store = ResolutionStore::init(
        workspace.dir(),
        StoreConfig::default(),
        &mut manifest,
        &mut FixedValues::new().architecture("arm"),
    )
    .unwrap();

    let mut mutator = DependencyMutator::new(workspace.dir());
    mutator
        .add_script_dependency(
            &mut manifest,
            store.architecture(),
            store.policy(),
            "install.sh",
            "nginx",
        )
        .unwrap();

    manifest.flush(workspace.dir()).unwrap();
    let out = dir.path().join("out.csar");
    workspace.close(&out).unwrap();

    let meta = read_entry(&out, "TOSCA-Metadata/TOSCA.meta").unwrap();
    let reparsed = Manifest::parse(&meta, &out).unwrap();
    assert_eq!(
        reparsed.entry_definitions(),
        Some(NormalizedPath::new("Definitions/app.tosca"))
    );
    assert!(reparsed.contains(&descriptor::descriptor_path()));
    assert!(
        read_entry(&out, "Definitions/app.tosca")
            .unwrap()
            .contains("<TargetElement ref=\"nginx_arm\"/>")
    );
}

#[test]
fn descriptor_is_identical_across_archives() {
    let (_a, first) = TestCsar::sample().write_temp("a.csar");
    let (_b, second) = TestCsar::new()
        .with_file("TOSCA-Metadata/TOSCA.meta", fixtures::TOSCA_META)
        .with_file("Definitions/app.tosca", fixtures::PREFIXED_SERVICE_TEMPLATE)
        .write_temp("b.csar");

    let mut rendered = Vec::new();
    for app in [&first, &second] {
        let workspace = ArchiveWorkspace::open(app).unwrap();
        let mut manifest = Manifest::init(workspace.dir()).unwrap();
        let path = descriptor::ensure(workspace.dir(), &mut manifest).unwrap();
        rendered.push(std::fs::read(path.under(workspace.dir())).unwrap());
        workspace.discard().unwrap();
    }

    assert_eq!(rendered[0], rendered[1]);
}
