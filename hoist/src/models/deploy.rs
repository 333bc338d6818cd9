//! Deploy models

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What is (or was) running for a service in an environment.
///
/// An empty `tag` means nothing is deployed or the state is unknown. That is
/// a normal answer, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deploy {
    pub service: String,
    pub env: String,

    /// Build tag, empty when nothing is deployed
    pub tag: String,

    /// Time since this deploy began, zero when `tag` is empty
    pub uptime: Duration,
}

impl Deploy {
    pub fn new(service: &str, env: &str, tag: impl Into<String>, uptime: Duration) -> Self {
        Self {
            service: service.to_string(),
            env: env.to_string(),
            tag: tag.into(),
            uptime,
        }
    }

    /// Nothing deployed for this service/env
    pub fn none(service: &str, env: &str) -> Self {
        Self::new(service, env, "", Duration::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.tag.is_empty()
    }
}
