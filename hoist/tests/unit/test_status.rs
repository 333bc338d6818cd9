//! Status aggregation tests

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;

use hoist::config::Config;
use hoist::deploy::status::{HEALTHY, NOT_APPLICABLE};
use hoist::{format_uptime, get_status, HistoryProviders, HoistError};

use crate::common::{deploy, providers_for, test_config, MockHistoryProvider};

fn hours(h: u64) -> Duration {
    Duration::from_secs(h * 3600)
}

fn full_mock() -> MockHistoryProvider {
    MockHistoryProvider {
        current_deploys: [
            deploy("backend", "production", "main-aaa0001-20250101000000", hours(72)),
            deploy("backend", "staging", "main-aaa0002-20250102000000", hours(2)),
            deploy("frontend", "production", "main-bbb0001-20250101000000", hours(30)),
            deploy("frontend", "staging", "main-bbb0002-20250102000000", Duration::from_secs(40 * 60)),
        ]
        .into_iter()
        .collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_status_rows_sorted_by_service_then_env() {
    let mut mock = full_mock();
    // Finish in reverse row order
    mock.delays = [
        ("backend:production".to_string(), Duration::from_millis(40)),
        ("backend:staging".to_string(), Duration::from_millis(30)),
        ("frontend:production".to_string(), Duration::from_millis(20)),
        ("frontend:staging".to_string(), Duration::from_millis(10)),
    ]
    .into_iter()
    .collect();
    let providers = providers_for(Arc::new(mock));

    let rows = assert_ok!(get_status(&CancellationToken::new(), &test_config(), &providers, None).await);

    let keys: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r.service.as_str(), r.env.as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("backend", "production"),
            ("backend", "staging"),
            ("frontend", "production"),
            ("frontend", "staging"),
        ]
    );
    assert_eq!(rows[0].tag, "main-aaa0001-20250101000000");
    assert_eq!(format_uptime(rows[0].uptime), "3d");
    assert_eq!(format_uptime(rows[1].uptime), "2h");
    assert_eq!(format_uptime(rows[3].uptime), "40m");
}

#[tokio::test]
async fn test_status_health_per_kind() {
    let providers = providers_for(Arc::new(full_mock()));

    let rows = get_status(&CancellationToken::new(), &test_config(), &providers, None)
        .await
        .unwrap();

    for row in rows {
        let want = if row.service == "backend" { HEALTHY } else { NOT_APPLICABLE };
        assert_eq!(row.health, want, "{}/{}", row.service, row.env);
    }
}

#[tokio::test]
async fn test_status_env_filter() {
    let providers = providers_for(Arc::new(full_mock()));
    let config = test_config();

    let rows = get_status(&CancellationToken::new(), &config, &providers, Some("staging"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.env == "staging"));

    let rows = get_status(&CancellationToken::new(), &config, &providers, Some("qa"))
        .await
        .unwrap();
    assert!(rows.is_empty());

    let rows = get_status(&CancellationToken::new(), &config, &providers, Some(""))
        .await
        .unwrap();
    assert_eq!(rows.len(), 4);
}

#[tokio::test]
async fn test_status_missing_deploy_is_empty_row() {
    let mut mock = full_mock();
    mock.current_deploys.remove("frontend:staging");
    let providers = providers_for(Arc::new(mock));

    let rows = get_status(&CancellationToken::new(), &test_config(), &providers, Some("staging"))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].service, "frontend");
    assert_eq!(rows[1].tag, "");
    assert_eq!(rows[1].uptime, Duration::ZERO);
}

#[tokio::test]
async fn test_status_skips_kinds_without_provider() {
    let mut config: Config = test_config();
    let mut lambda = config.services["backend"].clone();
    lambda.kind = "lambda".to_string();
    config.services.insert("worker".to_string(), lambda);

    let providers = providers_for(Arc::new(full_mock()));
    let rows = get_status(&CancellationToken::new(), &config, &providers, None)
        .await
        .unwrap();

    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.service != "worker"));

    let rows = get_status(&CancellationToken::new(), &config, &HistoryProviders::new(), None)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_status_first_error_in_row_order_wins() {
    let mut mock = full_mock();
    mock.current_errors = [
        ("backend:staging".to_string(), "SSH connection refused".to_string()),
        ("frontend:production".to_string(), "AccessDenied".to_string()),
    ]
    .into_iter()
    .collect();
    // The later row fails first
    mock.delays = [("backend:staging".to_string(), Duration::from_millis(30))]
        .into_iter()
        .collect();
    let providers = providers_for(Arc::new(mock));

    let err = get_status(&CancellationToken::new(), &test_config(), &providers, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HoistError::Aggregation { ref service, ref env, .. } if service == "backend" && env == "staging"
    ));
    assert!(err.to_string().contains("SSH connection refused"));
}

#[tokio::test]
async fn test_status_cancelled() {
    let mut mock = full_mock();
    mock.delays = [("backend:production".to_string(), Duration::from_secs(60))]
        .into_iter()
        .collect();
    let providers = providers_for(Arc::new(mock));
    let cancel = CancellationToken::new();
    let config = test_config();

    let status = get_status(&cancel, &config, &providers, None);
    let trigger = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();
    };
    let (result, _) = tokio::join!(status, trigger);

    assert!(matches!(result, Err(HoistError::Cancelled)));
}
