//! Rollback resolution tests

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio_test::assert_err;
use tokio_util::sync::CancellationToken;

use hoist::{resolve_rollback_targets, HoistError};

use crate::common::{deploy, providers_for, test_config, MockHistoryProvider};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_rollback_skips_services_without_previous_deploy() {
    let mock = Arc::new(MockHistoryProvider {
        previous_deploys: [deploy(
            "backend",
            "staging",
            "main-abc1234-20250101000000",
            Duration::ZERO,
        )]
        .into_iter()
        .collect(),
        ..Default::default()
    });
    let providers = providers_for(mock);
    let mut diagnostics = Vec::new();

    let plan = resolve_rollback_targets(
        &CancellationToken::new(),
        &test_config(),
        &providers,
        &names(&["backend", "frontend"]),
        "staging",
        &mut diagnostics,
    )
    .await
    .unwrap();

    assert_eq!(plan.targets, vec!["backend"]);
    assert_eq!(plan.skipped, vec!["frontend"]);
    assert_eq!(plan.tags["backend"], "main-abc1234-20250101000000");
    assert_eq!(
        String::from_utf8(diagnostics).unwrap(),
        "skipping frontend: no previous deploy\n"
    );
}

#[tokio::test]
async fn test_rollback_all_services_when_none_requested() {
    let mock = Arc::new(MockHistoryProvider {
        previous_deploys: [
            deploy("backend", "production", "main-aaa0001-20250101000000", Duration::ZERO),
            deploy("frontend", "production", "main-bbb0002-20250101000000", Duration::ZERO),
        ]
        .into_iter()
        .collect(),
        ..Default::default()
    });
    let providers = providers_for(mock.clone());
    let mut diagnostics = Vec::new();

    let plan = resolve_rollback_targets(
        &CancellationToken::new(),
        &test_config(),
        &providers,
        &[],
        "production",
        &mut diagnostics,
    )
    .await
    .unwrap();

    assert_eq!(plan.targets, vec!["backend", "frontend"]);
    assert!(plan.skipped.is_empty());
    assert!(diagnostics.is_empty());
    assert_eq!(
        *mock.calls.lock().unwrap(),
        vec!["previous backend:production", "previous frontend:production"]
    );
}

#[tokio::test]
async fn test_rollback_nothing_to_roll_back() {
    let providers = providers_for(Arc::new(MockHistoryProvider::default()));
    let mut diagnostics = Vec::new();

    let plan = resolve_rollback_targets(
        &CancellationToken::new(),
        &test_config(),
        &providers,
        &[],
        "staging",
        &mut diagnostics,
    )
    .await
    .unwrap();

    assert!(plan.is_empty());
    assert_eq!(plan.skipped, vec!["backend", "frontend"]);
}

#[tokio::test]
async fn test_rollback_unknown_service() {
    let mock = Arc::new(MockHistoryProvider::default());
    let providers = providers_for(mock.clone());
    let mut diagnostics = Vec::new();

    let err = assert_err!(
        resolve_rollback_targets(
            &CancellationToken::new(),
            &test_config(),
            &providers,
            &names(&["backend", "nonexistent"]),
            "staging",
            &mut diagnostics,
        )
        .await
    );

    assert!(err.to_string().contains("unknown service"));
    assert!(err.is_config_fault());
    assert!(mock.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rollback_missing_environment() {
    let providers = providers_for(Arc::new(MockHistoryProvider::default()));
    let mut diagnostics = Vec::new();

    let err = resolve_rollback_targets(
        &CancellationToken::new(),
        &test_config(),
        &providers,
        &names(&["frontend"]),
        "qa",
        &mut diagnostics,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("has no environment"));
    assert!(err.is_config_fault());
}

#[tokio::test]
async fn test_rollback_provider_error_aborts() {
    let mock = Arc::new(MockHistoryProvider {
        previous_errors: [(
            "backend:staging".to_string(),
            "SSH connection refused".to_string(),
        )]
        .into_iter()
        .collect(),
        previous_deploys: [deploy(
            "frontend",
            "staging",
            "main-bbb0002-20250101000000",
            Duration::ZERO,
        )]
        .into_iter()
        .collect(),
        ..Default::default()
    });
    let providers = providers_for(mock.clone());
    let mut diagnostics = Vec::new();

    let err = resolve_rollback_targets(
        &CancellationToken::new(),
        &test_config(),
        &providers,
        &[],
        "staging",
        &mut diagnostics,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, HoistError::Resolution { ref service, .. } if service == "backend"));
    assert!(err.to_string().contains("SSH connection refused"));
    assert!(!err.is_config_fault());
    // frontend comes after backend and is never asked
    assert_eq!(*mock.calls.lock().unwrap(), vec!["previous backend:staging"]);
    assert!(diagnostics.is_empty());
}
