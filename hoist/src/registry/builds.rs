//! Build listing over an image registry

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ServiceConfig;
use crate::errors::HoistError;
use crate::models::build::Build;
use crate::registry::image::ImageRegistry;
use crate::utils::or_cancel;

const REGISTRY_HOST_SUFFIX: &str = ".amazonaws.com/";

/// Extract the repository name from a full image reference.
///
/// `123456.dkr.ecr.us-east-1.amazonaws.com/myapp` gives `myapp`; anything
/// that is not a registry URL is returned unchanged.
pub fn parse_repository(image: &str) -> &str {
    match image.find(REGISTRY_HOST_SUFFIX) {
        Some(idx) => &image[idx + REGISTRY_HOST_SUFFIX.len()..],
        None => image,
    }
}

/// Builds published for one repository
pub struct BuildRegistry {
    registry: Arc<dyn ImageRegistry>,
    repository: String,
}

impl BuildRegistry {
    pub fn new(registry: Arc<dyn ImageRegistry>, repository: impl Into<String>) -> Self {
        Self {
            registry,
            repository: repository.into(),
        }
    }

    /// Registry for a container-orchestrated service, from its image reference
    pub fn for_service(
        registry: Arc<dyn ImageRegistry>,
        name: &str,
        service: &ServiceConfig,
    ) -> Result<Self, HoistError> {
        let image = service
            .image
            .as_deref()
            .filter(|i| !i.is_empty())
            .ok_or_else(|| {
                HoistError::ConfigError(format!("service {:?} has no image", name))
            })?;
        Ok(Self::new(registry, parse_repository(image)))
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// List builds, most recent first, windowed by `offset` and `limit`.
    ///
    /// Every page is fetched before sorting. Tags that are not build tags
    /// (`latest`, `cache`, ...) are dropped. Any page failure discards
    /// everything fetched so far.
    pub async fn list_builds(
        &self,
        cancel: &CancellationToken,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Build>, HoistError> {
        let mut all = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = or_cancel(
                cancel,
                self.registry
                    .describe_images(&self.repository, next_token.as_deref()),
            )
            .await?
            .map_err(|source| HoistError::Registry {
                repository: self.repository.clone(),
                source,
            })?;
            pages += 1;

            for image in &page.images {
                for tag in &image.tags {
                    match Build::parse(tag) {
                        Ok(build) => all.push(build),
                        Err(e) => debug!("Skipping tag in {}: {}", self.repository, e),
                    }
                }
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        info!(
            "Found {} builds in {} ({} pages)",
            all.len(),
            self.repository,
            pages
        );

        // Stable sort keeps registry order for identical build times
        all.sort_by(|a, b| b.time.cmp(&a.time));

        if offset >= all.len() {
            return Ok(Vec::new());
        }
        Ok(all.into_iter().skip(offset).take(limit).collect())
    }
}
