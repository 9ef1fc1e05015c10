//! Platform abstraction layer
//!
//! Signal delivery used when an execution exceeds its time limit. Platforms
//! without signals fall back to the runtime's forced kill.

mod traits;
#[cfg(unix)]
mod unix;

pub use traits::*;

/// Platform implementation factory
pub struct Platform;

impl Platform {
    /// Get the platform-specific signal operations
    pub fn signals() -> Box<dyn SignalOps> {
        #[cfg(unix)]
        {
            Box::new(unix::UnixSignals::new())
        }

        #[cfg(not(unix))]
        {
            Box::new(UnsupportedSignals)
        }
    }
}

/// Signal operations for platforms without POSIX signals
#[cfg(not(unix))]
struct UnsupportedSignals;

#[cfg(not(unix))]
#[async_trait::async_trait]
impl SignalOps for UnsupportedSignals {
    async fn send_terminate(&self, _pid: u32) -> crate::error::Result<()> {
        Err(crate::error::Error::SignalNotSupported {
            signal: "SIGTERM".to_string(),
            platform: std::env::consts::OS.to_string(),
        })
    }

    fn is_process_running(&self, _pid: u32) -> bool {
        // Liveness is unknown without signals; callers fall back to a forced kill
        true
    }
}
