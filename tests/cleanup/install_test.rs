//! Package install tests.

use std::fs;
use std::path::Path;

use pulp_selinux::cleanup::{install, package_path, InstallError, InstallOutcome};
use pulp_selinux::policy::PolicyVariant;

use crate::recording_store::{Call, RecordingStore};

fn write_package(root: &Path, variant: PolicyVariant) {
    let path = package_path(root, variant, "pulp");
    let parent = path.parent().expect("package path has a parent");
    fs::create_dir_all(parent).expect("should create variant dir");
    fs::write(&path, b"compiled policy").expect("should write package");
}

#[tokio::test]
async fn installs_only_variants_with_packages() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    write_package(tmp.path(), PolicyVariant::Targeted);
    let store = RecordingStore::new();

    let outcomes = install(&store, "pulp", &PolicyVariant::ALL, tmp.path())
        .await
        .expect("install should succeed");

    assert_eq!(outcomes.len(), 3);
    assert!(matches!(outcomes[0].1, InstallOutcome::Skipped { .. }));
    assert!(matches!(outcomes[1].1, InstallOutcome::Skipped { .. }));
    assert!(matches!(outcomes[2].1, InstallOutcome::Installed { .. }));
    assert_eq!(
        store.calls(),
        vec![Call::Install(
            PolicyVariant::Targeted,
            package_path(tmp.path(), PolicyVariant::Targeted, "pulp")
        )]
    );
    assert!(store.has_module(PolicyVariant::Targeted, "pulp"));
}

#[tokio::test]
async fn no_packages_is_an_error() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let store = RecordingStore::new();

    let result = install(&store, "pulp", &PolicyVariant::ALL, tmp.path()).await;

    assert!(matches!(result, Err(InstallError::NoPackages { .. })));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn stops_at_first_store_failure() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    for variant in PolicyVariant::ALL {
        write_package(tmp.path(), variant);
    }
    let store = RecordingStore::new().with_broken(PolicyVariant::Strict);

    let result = install(&store, "pulp", &PolicyVariant::ALL, tmp.path()).await;

    match result {
        Err(InstallError::Store { variant, .. }) => assert_eq!(variant, PolicyVariant::Strict),
        other => panic!("expected store failure, got {other:?}"),
    }
    assert_eq!(store.calls().len(), 2);
    assert!(store.has_module(PolicyVariant::Mls, "pulp"));
    assert!(!store.has_module(PolicyVariant::Targeted, "pulp"));
}
