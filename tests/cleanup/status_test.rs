//! Module status tests.

use pulp_selinux::cleanup::{status, ModuleStatus};
use pulp_selinux::policy::PolicyVariant;

use crate::recording_store::{Call, RecordingStore};

#[tokio::test]
async fn reports_each_variant_in_order() {
    let store = RecordingStore::new()
        .with_module(PolicyVariant::Targeted, "pulp")
        .with_module(PolicyVariant::Mls, "apache")
        .with_broken(PolicyVariant::Strict);

    let lines = status(&store, "pulp", &PolicyVariant::ALL).await;

    let variants: Vec<PolicyVariant> = lines.iter().map(|l| l.variant).collect();
    assert_eq!(variants, PolicyVariant::ALL.to_vec());
    assert_eq!(lines[0].status, ModuleStatus::Absent);
    assert!(matches!(lines[1].status, ModuleStatus::Unavailable(_)));
    assert_eq!(lines[2].status, ModuleStatus::Present);
    assert_eq!(
        store.calls(),
        PolicyVariant::ALL.iter().map(|v| Call::List(*v)).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn module_name_must_match_exactly() {
    let store = RecordingStore::new().with_module(PolicyVariant::Targeted, "pulp-server");
    let lines = status(&store, "pulp", &[PolicyVariant::Targeted]).await;
    assert_eq!(lines[0].status, ModuleStatus::Absent);
}
