//! Status aggregation across the service/environment matrix

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{kind, sorted_service_names, Config};
use crate::errors::HoistError;
use crate::history::{HistoryProvider, HistoryProviders};
use crate::models::deploy::Deploy;
use crate::utils::or_cancel;

/// Health reported for container-orchestrated services
pub const HEALTHY: &str = "healthy";

/// Health reported for kinds without a health notion
pub const NOT_APPLICABLE: &str = "-";

/// One (service, env) observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRow {
    pub service: String,
    pub env: String,
    pub tag: String,
    pub uptime: Duration,
    pub health: String,
}

struct Query {
    service: String,
    env: String,
    kind: String,
    provider: Arc<dyn HistoryProvider>,
}

fn health_for(service_kind: &str) -> &'static str {
    // TODO: query the container health check once the remote executor exposes it
    if service_kind == kind::SERVER {
        HEALTHY
    } else {
        NOT_APPLICABLE
    }
}

/// Current deploy of every configured (service, env), optionally for one env.
///
/// Rows come back sorted by service then env. Pairs whose kind has no
/// provider are left out. All lookups run concurrently; if any fail, the
/// first failure in row order is returned and no rows are.
pub async fn get_status(
    cancel: &CancellationToken,
    config: &Config,
    providers: &HistoryProviders,
    env_filter: Option<&str>,
) -> Result<Vec<StatusRow>, HoistError> {
    let env_filter = env_filter.filter(|f| !f.is_empty());

    let mut queries = Vec::new();
    for name in sorted_service_names(config) {
        let service = &config.services[name];
        let Some(provider) = providers.get(&service.kind) else {
            debug!("No history provider for {} ({}), skipping", name, service.kind);
            continue;
        };
        for env in service.env_names() {
            if env_filter.is_some_and(|filter| filter != env) {
                continue;
            }
            queries.push(Query {
                service: name.to_string(),
                env: env.to_string(),
                kind: service.kind.clone(),
                provider: provider.clone(),
            });
        }
    }

    info!("Querying status of {} service environments", queries.len());

    let handles = queries.iter().map(|q| {
        let cancel = cancel.clone();
        let provider = q.provider.clone();
        let (service, env) = (q.service.clone(), q.env.clone());
        tokio::spawn(async move {
            or_cancel(&cancel, provider.current(&cancel, &service, &env))
                .await
                .and_then(|result| result)
        })
    });
    let results = join_all(handles).await;

    let mut rows = Vec::with_capacity(queries.len());
    for (query, result) in queries.into_iter().zip(results) {
        let deploy: Deploy = result
            .map_err(|e| HoistError::Internal(format!("status task panicked: {}", e)))
            .and_then(|r| r)
            .map_err(|e| match e {
                HoistError::Cancelled => e,
                e => HoistError::Aggregation {
                    service: query.service.clone(),
                    env: query.env.clone(),
                    source: Box::new(e),
                },
            })?;

        rows.push(StatusRow {
            health: health_for(&query.kind).to_string(),
            service: query.service,
            env: query.env,
            tag: deploy.tag,
            uptime: deploy.uptime,
        });
    }
    Ok(rows)
}

/// Compact uptime: minutes under an hour, hours under a day, then days
pub fn format_uptime(d: Duration) -> String {
    const HOUR: u64 = 60 * 60;
    const DAY: u64 = 24 * HOUR;

    let secs = d.as_secs();
    if secs < HOUR {
        format!("{}m", secs / 60)
    } else if secs < DAY {
        format!("{}h", secs / HOUR)
    } else {
        format!("{}d", secs / DAY)
    }
}
