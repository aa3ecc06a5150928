//! Profile selection to credential contexts.

mod common;

use common::{MockAccount, MockProfileStore, MockSessionProvider, MockWorld};
use ratkiez::accounts::resolve;
use ratkiez::config::{AuditConfig, FailurePolicy, ProfileSelection};
use ratkiez::error::AuditError;
use std::sync::Arc;

fn world() -> Arc<MockWorld> {
    MockWorld::new()
        .account(MockAccount::new("111111111111", "Prod"))
        .account(MockAccount::new("222222222222", "Staging"))
        .account(MockAccount::new("900000000000", "Management").organization(&[
            ("900000000000", "Management"),
            ("111111111111", "Prod"),
            ("222222222222", "Staging"),
        ]))
        .profile("p1", "111111111111")
        .profile("p3", "222222222222")
        .profile("mgmt", "900000000000")
        .build()
}

fn labels(contexts: &[ratkiez::context::CredentialContext]) -> Vec<String> {
    contexts
        .iter()
        .map(|c| format!("{}:{}", c.profile_label(), c.account_id()))
        .collect()
}

#[tokio::test]
async fn test_best_effort_skips_broken_profile() {
    let world = world();
    let selection = ProfileSelection::profiles(["p1", "broken", "p3"]);

    let resolution = resolve(
        &selection,
        &AuditConfig::default(),
        &MockSessionProvider::new(&world),
        &MockProfileStore::unreadable(),
    )
    .await
    .unwrap();

    assert_eq!(labels(&resolution.contexts), vec!["p1:", "p3:"]);
    assert_eq!(resolution.warnings.len(), 1);
    let warning = &resolution.warnings[0];
    assert_eq!(warning.scope.profile_label, "broken");
    assert!(warning.message.starts_with("failed to create session"));
}

#[tokio::test]
async fn test_fail_fast_stops_at_broken_profile() {
    let world = world();
    let selection = ProfileSelection::profiles(["p1", "broken", "p3"]);
    let config = AuditConfig::default().with_policy(FailurePolicy::FailFast);

    let err = resolve(
        &selection,
        &config,
        &MockSessionProvider::new(&world),
        &MockProfileStore::unreadable(),
    )
    .await
    .unwrap_err();

    match err {
        AuditError::ContextConstruction { profile, .. } => assert_eq!(profile, "broken"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_no_usable_profiles() {
    let world = world();
    let selection = ProfileSelection::profiles(["broken", "also-broken"]);

    let err = resolve(
        &selection,
        &AuditConfig::default(),
        &MockSessionProvider::new(&world),
        &MockProfileStore::unreadable(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AuditError::NoContexts));
}

#[tokio::test]
async fn test_conflicting_modes_rejected_before_connecting() {
    let world = world();
    let selection = ProfileSelection {
        profiles: vec![],
        all_profiles: true,
        expand_organization: true,
    };

    let err = resolve(
        &selection,
        &AuditConfig::default(),
        &MockSessionProvider::new(&world),
        &MockProfileStore::with_profiles(&["p1"]),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AuditError::ConflictingModes));
    assert!(world.connected_regions().is_empty());
}

#[tokio::test]
async fn test_all_profiles_come_from_store() {
    let world = world();
    let selection = ProfileSelection {
        all_profiles: true,
        ..ProfileSelection::default()
    };

    let resolution = resolve(
        &selection,
        &AuditConfig::default(),
        &MockSessionProvider::new(&world),
        &MockProfileStore::with_profiles(&["p3", "p1"]),
    )
    .await
    .unwrap();

    assert_eq!(labels(&resolution.contexts), vec!["p3:", "p1:"]);
}

#[tokio::test]
async fn test_unreadable_store_is_fatal() {
    let world = world();
    let selection = ProfileSelection {
        all_profiles: true,
        ..ProfileSelection::default()
    };

    let err = resolve(
        &selection,
        &AuditConfig::default(),
        &MockSessionProvider::new(&world),
        &MockProfileStore::unreadable(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AuditError::ProfileStore(_)));
}

#[tokio::test]
async fn test_region_is_passed_to_every_session() {
    let world = world();
    let config = AuditConfig {
        region: "eu-central-1".to_string(),
        ..AuditConfig::default()
    };

    let resolution = resolve(
        &ProfileSelection::profiles(["p1", "p3"]),
        &config,
        &MockSessionProvider::new(&world),
        &MockProfileStore::unreadable(),
    )
    .await
    .unwrap();

    assert_eq!(world.connected_regions(), vec!["eu-central-1", "eu-central-1"]);
    assert!(resolution.contexts.iter().all(|c| c.region() == "eu-central-1"));
}

#[tokio::test]
async fn test_members_follow_their_base_context() {
    let world = world();
    let selection = ProfileSelection::profiles(["mgmt"]).with_organization();

    let resolution = resolve(
        &selection,
        &AuditConfig::default(),
        &MockSessionProvider::new(&world),
        &MockProfileStore::unreadable(),
    )
    .await
    .unwrap();

    assert_eq!(
        labels(&resolution.contexts),
        vec![
            "mgmt:",
            "member-of-mgmt:111111111111",
            "member-of-mgmt:222222222222",
        ]
    );
    assert!(resolution.warnings.is_empty());
}

#[tokio::test]
async fn test_expansion_failure_keeps_base_context() {
    let world = world();
    let selection = ProfileSelection::profiles(["p1", "mgmt"]).with_organization();

    let resolution = resolve(
        &selection,
        &AuditConfig::default(),
        &MockSessionProvider::new(&world),
        &MockProfileStore::unreadable(),
    )
    .await
    .unwrap();

    assert_eq!(resolution.contexts.len(), 4);
    assert_eq!(resolution.contexts[0].profile_label(), "p1");
    assert_eq!(resolution.warnings.len(), 1);
    assert_eq!(resolution.warnings[0].scope.profile_label, "p1");
    assert!(resolution.warnings[0]
        .message
        .contains("AWS Organizations is not enabled"));
}

#[tokio::test]
async fn test_repeated_profiles_are_kept_in_order() {
    let world = world();
    let selection = ProfileSelection::profiles(["p1", "p3", "p1"]);

    let resolution = resolve(
        &selection,
        &AuditConfig::default(),
        &MockSessionProvider::new(&world),
        &MockProfileStore::unreadable(),
    )
    .await
    .unwrap();

    assert_eq!(labels(&resolution.contexts), vec!["p1:", "p3:", "p1:"]);
    assert_eq!(world.connected_regions().len(), 3);
}
