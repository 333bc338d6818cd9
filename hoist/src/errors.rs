//! Error types for hoist

use thiserror::Error;

/// Opaque failure reported by an external capability (registry, storage, remote shell)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for hoist
#[derive(Error, Debug)]
pub enum HoistError {
    #[error("invalid tag {tag:?}: {reason}")]
    InvalidTag { tag: String, reason: String },

    #[error("describing images in {repository}: {source}")]
    Registry {
        repository: String,
        #[source]
        source: BoxError,
    },

    #[error("{operation} for {service}/{env}: {source}")]
    Provider {
        service: String,
        env: String,
        operation: String,
        #[source]
        source: BoxError,
    },

    #[error("getting status for {service}/{env}: {source}")]
    Aggregation {
        service: String,
        env: String,
        #[source]
        source: Box<HoistError>,
    },

    #[error("resolving previous deploy for {service}/{env}: {source}")]
    Resolution {
        service: String,
        env: String,
        #[source]
        source: Box<HoistError>,
    },

    #[error("unknown service {0:?}")]
    UnknownService(String),

    #[error("unknown service kind {kind:?} for service {service:?}")]
    UnknownServiceKind { service: String, kind: String },

    #[error("service {service:?} has no environment {env:?}")]
    EnvironmentNotFound { service: String, env: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HoistError {
    /// Wrap a provider-side fault with the service/env it was raised for
    pub fn provider(
        service: &str,
        env: &str,
        operation: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        HoistError::Provider {
            service: service.to_string(),
            env: env.to_string(),
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// True for caller/config mistakes that abort without touching a provider
    pub fn is_config_fault(&self) -> bool {
        matches!(
            self,
            HoistError::UnknownService(_)
                | HoistError::UnknownServiceKind { .. }
                | HoistError::EnvironmentNotFound { .. }
                | HoistError::ConfigError(_)
        )
    }
}

impl From<anyhow::Error> for HoistError {
    fn from(err: anyhow::Error) -> Self {
        HoistError::Internal(err.to_string())
    }
}
