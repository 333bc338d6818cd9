//! Build models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::HoistError;
use crate::tag::{parse_tag, BuildTag};

/// A build available in the image registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    /// Tag as stored by the registry
    pub tag: String,

    /// Source branch
    pub branch: String,

    /// Short commit hash
    pub sha: String,

    /// Build time
    pub time: DateTime<Utc>,

    /// Commit message, empty when the registry has none
    #[serde(default)]
    pub message: String,

    /// Commit author, empty when the registry has none
    #[serde(default)]
    pub author: String,
}

impl Build {
    /// Build a record from a decoded tag, without commit metadata
    pub fn from_tag(tag: BuildTag) -> Self {
        let raw = tag.encode();
        Self {
            tag: raw,
            branch: tag.branch,
            sha: tag.sha,
            time: tag.time,
            message: String::new(),
            author: String::new(),
        }
    }

    /// Decode a registry tag string into a build
    pub fn parse(tag: &str) -> Result<Self, HoistError> {
        let decoded = parse_tag(tag)?;
        Ok(Self {
            tag: tag.to_string(),
            ..Self::from_tag(decoded)
        })
    }

    /// Attach commit metadata
    pub fn with_commit(mut self, message: impl Into<String>, author: impl Into<String>) -> Self {
        self.message = message.into();
        self.author = author.into();
        self
    }
}
