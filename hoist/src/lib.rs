//! Hoist Library
//!
//! Read-only decision core of the hoist deployment tool: which builds
//! exist, what is deployed where, and what to roll back to.

pub mod config;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod history;
pub mod logs;
pub mod models;
pub mod registry;
pub mod remote;
pub mod storage;
pub mod tag;
pub mod utils;

pub use deploy::rollback::{resolve_rollback_targets, RollbackPlan};
pub use deploy::status::{format_uptime, get_status, StatusRow};
pub use errors::HoistError;
pub use history::{HistoryProvider, HistoryProviders};
pub use models::build::Build;
pub use models::deploy::Deploy;
pub use registry::builds::BuildRegistry;
