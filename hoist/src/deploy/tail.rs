//! Log tail planning
//!
//! Tailing itself runs elsewhere (remote shell, CDN log fetch); this module
//! only decides what to run and where.

use std::sync::Arc;

use serde::Serialize;

use crate::config::{kind, Config};
use crate::errors::HoistError;

/// Arguments for `docker logs`
pub fn docker_logs_args(container: &str, since: &str, n: usize, follow: bool) -> Vec<String> {
    let mut args = vec!["logs".to_string()];

    if n > 0 {
        args.push("--tail".to_string());
        args.push(n.to_string());
    }

    if !since.is_empty() {
        args.push("--since".to_string());
        args.push(since.to_string());
    }

    if follow {
        args.push("-f".to_string());
    }

    args.push(container.to_string());
    args
}

/// How to get at a service's logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TailPlan {
    /// Run a command on a node
    Remote {
        node: String,
        program: String,
        args: Vec<String>,
    },

    /// Fetch CDN access logs for a static site
    AccessLogs {
        cloudfront: Option<String>,
        bucket: Option<String>,
    },
}

/// Log tail planner for one service kind
pub trait TailProvider: Send + Sync {
    /// Plan a tail of the last `n` lines and/or entries newer than `since`
    fn tail(&self, service: &str, env: &str, n: usize, since: &str) -> Result<TailPlan, HoistError>;
}

/// Factory for tail providers
pub struct TailProviderFactory;

impl TailProviderFactory {
    /// Tail provider for a service kind, `None` when the kind has no logs
    pub fn create(service_kind: &str, config: Arc<Config>) -> Option<Arc<dyn TailProvider>> {
        match service_kind {
            kind::SERVER => Some(Arc::new(ServerTail::new(config))),
            kind::STATIC => Some(Arc::new(StaticTail::new(config))),
            _ => None,
        }
    }
}

/// `docker logs` on the service node
pub struct ServerTail {
    config: Arc<Config>,
}

impl ServerTail {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

impl TailProvider for ServerTail {
    fn tail(&self, service: &str, env: &str, n: usize, since: &str) -> Result<TailPlan, HoistError> {
        let node = self
            .config
            .env(service, env)?
            .node
            .clone()
            .ok_or_else(|| HoistError::ConfigError(format!("{}/{} has no node", service, env)))?;

        // Neither a line count nor a window: stream
        let follow = n == 0 && since.is_empty();

        Ok(TailPlan::Remote {
            node,
            program: "docker".to_string(),
            args: docker_logs_args(service, since, n, follow),
        })
    }
}

/// CDN access logs for the site
pub struct StaticTail {
    config: Arc<Config>,
}

impl StaticTail {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

impl TailProvider for StaticTail {
    fn tail(&self, service: &str, env: &str, _n: usize, _since: &str) -> Result<TailPlan, HoistError> {
        let ec = self.config.env(service, env)?;
        Ok(TailPlan::AccessLogs {
            cloudfront: ec.cloudfront.clone(),
            bucket: ec.bucket.clone(),
        })
    }
}
