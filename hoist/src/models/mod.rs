//! Value types shared by the registry, providers and aggregators

pub mod build;
pub mod deploy;
