//! History provider for container-orchestrated services
//!
//! The running container is named after the service. Its image reference
//! carries the live build tag, and the deploy step stamps the tag it
//! replaced into the `hoist.previous` label.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Config;
use crate::errors::HoistError;
use crate::history::{elapsed, system_clock, Clock, HistoryProvider};
use crate::models::deploy::Deploy;
use crate::remote::{ExecOutput, RemoteExecutor};
use crate::utils::or_cancel;

/// Container label holding the previously deployed tag
pub const PREVIOUS_LABEL: &str = "hoist.previous";

const CURRENT_FORMAT: &str = "{{.Config.Image}}|{{.State.StartedAt}}";

/// Docker prints this for a label that is not set
const NO_VALUE: &str = "<no value>";

/// `docker inspect` arguments reporting the image and start time of a container
pub fn inspect_current_args(container: &str) -> Vec<String> {
    vec![
        "inspect".to_string(),
        "--format".to_string(),
        CURRENT_FORMAT.to_string(),
        container.to_string(),
    ]
}

/// `docker inspect` arguments reporting the previous-tag label of a container
pub fn inspect_previous_args(container: &str) -> Vec<String> {
    vec![
        "inspect".to_string(),
        "--format".to_string(),
        format!("{{{{index .Config.Labels \"{}\"}}}}", PREVIOUS_LABEL),
        container.to_string(),
    ]
}

/// Tag part of an image reference, if it has one.
///
/// A colon inside the registry host (`host:5000/app`) is not a tag separator.
pub fn image_tag(image: &str) -> Option<&str> {
    let (_, tag) = image.rsplit_once(':')?;
    if tag.is_empty() || tag.contains('/') {
        None
    } else {
        Some(tag)
    }
}

fn is_missing_container(output: &ExecOutput) -> bool {
    output.stderr.contains("No such object") || output.stderr.contains("No such container")
}

/// Inspects the service container over the remote executor
pub struct ServerHistoryProvider {
    config: Arc<Config>,
    executor: Arc<dyn RemoteExecutor>,
    clock: Clock,
}

impl ServerHistoryProvider {
    pub fn new(config: Arc<Config>, executor: Arc<dyn RemoteExecutor>) -> Self {
        Self {
            config,
            executor,
            clock: system_clock(),
        }
    }

    /// Replace the clock used for uptime
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Run `docker <args>` on the service node.
    ///
    /// Returns `None` when the container does not exist.
    async fn inspect(
        &self,
        cancel: &CancellationToken,
        service: &str,
        env: &str,
        operation: &str,
        args: Vec<String>,
    ) -> Result<Option<String>, HoistError> {
        let node = self
            .config
            .env(service, env)?
            .node
            .as_deref()
            .ok_or_else(|| HoistError::ConfigError(format!("{}/{} has no node", service, env)))?;

        debug!("Running on {}: docker {}", node, args.join(" "));
        let output = or_cancel(cancel, self.executor.run(node, "docker", &args))
            .await?
            .map_err(|source| HoistError::provider(service, env, operation, source))?;

        if output.success() {
            return Ok(Some(output.stdout.trim().to_string()));
        }
        if is_missing_container(&output) {
            debug!("No {} container on {}", service, node);
            return Ok(None);
        }
        Err(HoistError::provider(
            service,
            env,
            operation,
            format!(
                "docker inspect exited with {}: {}",
                output.status,
                output.stderr.trim()
            ),
        ))
    }
}

#[async_trait]
impl HistoryProvider for ServerHistoryProvider {
    async fn current(
        &self,
        cancel: &CancellationToken,
        service: &str,
        env: &str,
    ) -> Result<Deploy, HoistError> {
        let operation = "inspecting running container";
        let Some(line) = self
            .inspect(cancel, service, env, operation, inspect_current_args(service))
            .await?
        else {
            return Ok(Deploy::none(service, env));
        };

        let malformed = |reason: String| HoistError::provider(service, env, operation, reason);

        let (image, started_at) = line
            .split_once('|')
            .ok_or_else(|| malformed(format!("unexpected inspect output {:?}", line)))?;
        let tag = image_tag(image)
            .ok_or_else(|| malformed(format!("image {:?} has no tag", image)))?;
        let started_at = DateTime::parse_from_rfc3339(started_at.trim())
            .map_err(|e| malformed(format!("bad start time {:?}: {}", started_at, e)))?;

        let uptime = elapsed((self.clock)(), started_at.with_timezone(&Utc));
        Ok(Deploy::new(service, env, tag, uptime))
    }

    async fn previous(
        &self,
        cancel: &CancellationToken,
        service: &str,
        env: &str,
    ) -> Result<Deploy, HoistError> {
        let label = self
            .inspect(
                cancel,
                service,
                env,
                "reading previous-tag label",
                inspect_previous_args(service),
            )
            .await?
            .unwrap_or_default();

        if label.is_empty() || label == NO_VALUE {
            return Ok(Deploy::none(service, env));
        }
        Ok(Deploy::new(service, env, label, std::time::Duration::ZERO))
    }
}
