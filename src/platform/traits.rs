//! Platform-specific operation traits

use crate::error::Result;

/// Platform-specific signal operations
#[async_trait::async_trait]
pub trait SignalOps: Send + Sync {
    /// Send a termination signal (graceful shutdown)
    async fn send_terminate(&self, pid: u32) -> Result<()>;

    /// Check if a process is still running
    fn is_process_running(&self, pid: u32) -> bool;
}
