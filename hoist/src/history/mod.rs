//! Deploy history providers
//!
//! Each service kind answers "what is running now" and "what ran before"
//! differently. Providers are registered by kind name once at startup and
//! looked up per service.

pub mod server;
pub mod static_site;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::config::{kind, Config, ServiceConfig};
use crate::errors::HoistError;
use crate::models::deploy::Deploy;
use crate::remote::RemoteExecutor;
use crate::storage::marker::MarkerStore;

use self::server::ServerHistoryProvider;
use self::static_site::StaticHistoryProvider;

/// Source of "now" for uptime calculations
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Wall clock
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Current/previous deploy lookup for one service kind.
///
/// Both methods return an empty `Deploy` when there is nothing to report
/// (never deployed, marker missing). `Err` is reserved for backend faults.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// What is running now
    async fn current(
        &self,
        cancel: &CancellationToken,
        service: &str,
        env: &str,
    ) -> Result<Deploy, HoistError>;

    /// What was running before the current deploy
    async fn previous(
        &self,
        cancel: &CancellationToken,
        service: &str,
        env: &str,
    ) -> Result<Deploy, HoistError>;
}

/// History providers keyed by service kind
#[derive(Clone, Default)]
pub struct HistoryProviders {
    providers: BTreeMap<String, Arc<dyn HistoryProvider>>,
}

impl HistoryProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Providers for the built-in `server` and `static` kinds
    pub fn from_config(
        config: Arc<Config>,
        executor: Arc<dyn RemoteExecutor>,
        store: Arc<dyn MarkerStore>,
    ) -> Self {
        let mut providers = Self::new();
        providers.register(
            kind::SERVER,
            Arc::new(ServerHistoryProvider::new(config.clone(), executor)),
        );
        providers.register(
            kind::STATIC,
            Arc::new(StaticHistoryProvider::new(config, store)),
        );
        providers
    }

    /// Register (or replace) the provider for a kind
    pub fn register(&mut self, kind: impl Into<String>, provider: Arc<dyn HistoryProvider>) -> &mut Self {
        self.providers.insert(kind.into(), provider);
        self
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn HistoryProvider>> {
        self.providers.get(kind).cloned()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.providers.contains_key(kind)
    }

    /// Provider for a configured service, failing when its kind is unregistered
    pub fn for_service(
        &self,
        name: &str,
        service: &ServiceConfig,
    ) -> Result<Arc<dyn HistoryProvider>, HoistError> {
        self.get(&service.kind)
            .ok_or_else(|| HoistError::UnknownServiceKind {
                service: name.to_string(),
                kind: service.kind.clone(),
            })
    }

    /// Registered kinds in sorted order
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for HistoryProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryProviders")
            .field("kinds", &self.kinds().collect::<Vec<_>>())
            .finish()
    }
}

/// Time elapsed since `since`, clamped at zero for clock skew
pub(crate) fn elapsed(now: DateTime<Utc>, since: DateTime<Utc>) -> std::time::Duration {
    (now - since).to_std().unwrap_or_default()
}
