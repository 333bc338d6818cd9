//! Image registry capability

use async_trait::async_trait;

use crate::errors::BoxError;

/// One image in a registry repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageDetail {
    /// Tags attached to the image, possibly none
    pub tags: Vec<String>,
}

impl ImageDetail {
    pub fn tagged<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// One page of a repository listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePage {
    pub images: Vec<ImageDetail>,

    /// Continuation token, `None` on the last page
    pub next_token: Option<String>,
}

/// Paginated listing of tagged images.
///
/// Implementations own transport concerns (credentials, retries); the
/// listing logic only sees pages or an opaque failure.
#[async_trait]
pub trait ImageRegistry: Send + Sync {
    /// Fetch one page of tagged images, starting after `next_token`
    async fn describe_images(
        &self,
        repository: &str,
        next_token: Option<&str>,
    ) -> Result<ImagePage, BoxError>;
}
