//! Deploy marker storage capability
//!
//! Static sites record what is live in small objects next to the site
//! itself: `current-tag` and `previous-tag`, each holding a build tag.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::errors::BoxError;

/// Marker key holding the live tag
pub const CURRENT_TAG_KEY: &str = "current-tag";

/// Marker key holding the tag that was live before it
pub const PREVIOUS_TAG_KEY: &str = "previous-tag";

/// A marker object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marker {
    pub body: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Marker storage failure
#[derive(Error, Debug)]
pub enum StorageError {
    /// The key does not exist in the bucket
    #[error("no such key")]
    NoSuchKey,

    #[error(transparent)]
    Backend(BoxError),
}

/// Read-by-key object storage
#[async_trait]
pub trait MarkerStore: Send + Sync {
    async fn get_marker(&self, bucket: &str, key: &str) -> Result<Marker, StorageError>;
}
