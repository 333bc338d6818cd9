//! Remote execution capability

use async_trait::async_trait;

use crate::errors::BoxError;

/// Result of a command run on a node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit status of the remote command
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs a command on a deployment node (SSH or similar).
///
/// A non-zero exit is reported through `ExecOutput::status`; `Err` is for
/// transport failures (connection refused, auth).
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    async fn run(&self, node: &str, program: &str, args: &[String]) -> Result<ExecOutput, BoxError>;
}
