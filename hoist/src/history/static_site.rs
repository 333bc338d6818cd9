//! History provider for static-asset sites

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Config;
use crate::errors::HoistError;
use crate::history::{elapsed, system_clock, Clock, HistoryProvider};
use crate::models::deploy::Deploy;
use crate::storage::marker::{MarkerStore, StorageError, CURRENT_TAG_KEY, PREVIOUS_TAG_KEY};
use crate::utils::or_cancel;

/// Reads the `current-tag` / `previous-tag` markers from the site bucket
pub struct StaticHistoryProvider {
    config: Arc<Config>,
    store: Arc<dyn MarkerStore>,
    clock: Clock,
}

impl StaticHistoryProvider {
    pub fn new(config: Arc<Config>, store: Arc<dyn MarkerStore>) -> Self {
        Self {
            config,
            store,
            clock: system_clock(),
        }
    }

    /// Replace the clock used for uptime
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    async fn read_marker(
        &self,
        cancel: &CancellationToken,
        service: &str,
        env: &str,
        key: &str,
    ) -> Result<Deploy, HoistError> {
        let bucket = self
            .config
            .env(service, env)?
            .bucket
            .as_deref()
            .ok_or_else(|| {
                HoistError::ConfigError(format!("{}/{} has no bucket", service, env))
            })?;

        let marker = match or_cancel(cancel, self.store.get_marker(bucket, key)).await? {
            Ok(marker) => marker,
            Err(StorageError::NoSuchKey) => {
                debug!("No {} marker in {} for {}/{}", key, bucket, service, env);
                return Ok(Deploy::none(service, env));
            }
            Err(StorageError::Backend(source)) => {
                return Err(HoistError::provider(
                    service,
                    env,
                    format!("reading {} from s3://{}", key, bucket),
                    source,
                ));
            }
        };

        let tag = marker.body.trim();
        if tag.is_empty() {
            return Ok(Deploy::none(service, env));
        }

        let uptime = marker
            .last_modified
            .map(|modified| elapsed((self.clock)(), modified))
            .unwrap_or_default();

        Ok(Deploy::new(service, env, tag, uptime))
    }
}

#[async_trait]
impl HistoryProvider for StaticHistoryProvider {
    async fn current(
        &self,
        cancel: &CancellationToken,
        service: &str,
        env: &str,
    ) -> Result<Deploy, HoistError> {
        self.read_marker(cancel, service, env, CURRENT_TAG_KEY).await
    }

    async fn previous(
        &self,
        cancel: &CancellationToken,
        service: &str,
        env: &str,
    ) -> Result<Deploy, HoistError> {
        self.read_marker(cancel, service, env, PREVIOUS_TAG_KEY).await
    }
}
