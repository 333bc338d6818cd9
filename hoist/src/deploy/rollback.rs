//! Rollback target resolution

use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{sorted_service_names, Config};
use crate::errors::HoistError;
use crate::history::{HistoryProvider, HistoryProviders};

/// Services to roll back and the tags to roll back to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RollbackPlan {
    /// Services with a previous deploy, in resolution order
    pub targets: Vec<String>,

    /// Previous tag per target
    pub tags: BTreeMap<String, String>,

    /// Services without a previous deploy, in resolution order
    pub skipped: Vec<String>,
}

impl RollbackPlan {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

struct Candidate<'a> {
    name: &'a str,
    provider: Arc<dyn HistoryProvider>,
}

/// Pick the services to roll back in `env`.
///
/// With `requested` empty, every service declaring `env` is a candidate, in
/// name order; otherwise exactly the requested services, in request order.
/// Unknown services, missing environments and unregistered kinds fail before
/// any provider is queried. A provider failure aborts the whole resolution.
/// Candidates with no previous deploy are skipped and reported on
/// `diagnostics`.
pub async fn resolve_rollback_targets<W: Write>(
    cancel: &CancellationToken,
    config: &Config,
    providers: &HistoryProviders,
    requested: &[String],
    env: &str,
    diagnostics: &mut W,
) -> Result<RollbackPlan, HoistError> {
    let names: Vec<&str> = if requested.is_empty() {
        sorted_service_names(config)
            .into_iter()
            .filter(|name| config.services[*name].has_env(env))
            .collect()
    } else {
        let mut seen = HashSet::new();
        requested
            .iter()
            .map(String::as_str)
            .filter(|name| seen.insert(*name))
            .collect()
    };

    let mut candidates = Vec::with_capacity(names.len());
    for name in names {
        let service = config.service(name)?;
        if !service.has_env(env) {
            return Err(HoistError::EnvironmentNotFound {
                service: name.to_string(),
                env: env.to_string(),
            });
        }
        let provider = providers.for_service(name, service)?;
        candidates.push(Candidate { name, provider });
    }

    debug!("Resolving rollback for {} services in {}", candidates.len(), env);

    let mut plan = RollbackPlan::default();
    for candidate in candidates {
        let prev = candidate
            .provider
            .previous(cancel, candidate.name, env)
            .await
            .map_err(|e| match e {
                HoistError::Cancelled => e,
                e => HoistError::Resolution {
                    service: candidate.name.to_string(),
                    env: env.to_string(),
                    source: Box::new(e),
                },
            })?;

        if prev.is_empty() {
            warn!("No previous deploy for {}/{}", candidate.name, env);
            writeln!(diagnostics, "skipping {}: no previous deploy", candidate.name)?;
            plan.skipped.push(candidate.name.to_string());
            continue;
        }

        plan.tags.insert(candidate.name.to_string(), prev.tag);
        plan.targets.push(candidate.name.to_string());
    }

    info!(
        "Rollback plan for {}: {} targets, {} skipped",
        env,
        plan.targets.len(),
        plan.skipped.len()
    );
    Ok(plan)
}
