//! Service catalog configuration

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::HoistError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Service kinds with a built-in history provider
pub mod kind {
    /// Container-orchestrated service running on a node
    pub const SERVER: &str = "server";

    /// Static-asset site served from object storage
    pub const STATIC: &str = "static";
}

/// Top-level configuration file (`hoist.json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Services keyed by name
    #[serde(default)]
    pub services: BTreeMap<String, ServiceConfig>,
}

/// One deployable service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service kind, selects the history provider
    #[serde(rename = "type")]
    pub kind: String,

    /// Image reference, for container-orchestrated services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Environments keyed by name
    #[serde(default)]
    pub env: BTreeMap<String, EnvConfig>,
}

/// Backend-specific connection info for one environment.
///
/// The decision core only checks that an environment exists; the fields are
/// read by the providers that need them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Node the service container runs on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,

    /// Bucket holding the static site and its deploy markers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// CDN distribution in front of the bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudfront: Option<String>,
}

impl Config {
    /// Load and validate a configuration file
    pub async fn load(file: &File) -> Result<Self, HoistError> {
        let config: Config = file.read_json().await?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<(), HoistError> {
        for (name, svc) in &self.services {
            if svc.kind.trim().is_empty() {
                return Err(HoistError::ConfigError(format!(
                    "service {:?} has no type",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Look up a service by name
    pub fn service(&self, name: &str) -> Result<&ServiceConfig, HoistError> {
        self.services
            .get(name)
            .ok_or_else(|| HoistError::UnknownService(name.to_string()))
    }

    /// Look up the connection info of a service environment
    pub fn env(&self, service: &str, env: &str) -> Result<&EnvConfig, HoistError> {
        self.service(service)?
            .env
            .get(env)
            .ok_or_else(|| HoistError::EnvironmentNotFound {
                service: service.to_string(),
                env: env.to_string(),
            })
    }
}

impl ServiceConfig {
    /// Whether the service declares the environment
    pub fn has_env(&self, env: &str) -> bool {
        self.env.contains_key(env)
    }

    /// Declared environment names in sorted order
    pub fn env_names(&self) -> impl Iterator<Item = &str> {
        self.env.keys().map(String::as_str)
    }
}

/// Service names in sorted order
pub fn sorted_service_names(config: &Config) -> Vec<&str> {
    config.services.keys().map(String::as_str).collect()
}
