//! Deployment decisions: rollback targets, status and log tailing

pub mod rollback;
pub mod status;
pub mod tail;
