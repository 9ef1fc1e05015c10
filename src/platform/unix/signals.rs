//! Unix signal operations

use crate::error::{Error, Result};
use crate::platform::traits::SignalOps;
use nix::sys::signal::{kill, Signal as NixSignal};
use nix::unistd::Pid;

pub struct UnixSignals;

impl UnixSignals {
    pub fn new() -> Self {
        Self
    }

    fn send(pid: u32, signal: NixSignal) -> Result<()> {
        let raw = i32::try_from(pid).map_err(|_| Error::SignalSendFailed {
            signal: signal.as_str().to_string(),
            reason: format!("pid {} out of range", pid),
        })?;
        kill(Pid::from_raw(raw), signal).map_err(|e| Error::SignalSendFailed {
            signal: signal.as_str().to_string(),
            reason: e.to_string(),
        })
    }
}

impl Default for UnixSignals {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SignalOps for UnixSignals {
    async fn send_terminate(&self, pid: u32) -> Result<()> {
        Self::send(pid, NixSignal::SIGTERM)
    }

    fn is_process_running(&self, pid: u32) -> bool {
        // Signal 0 performs the permission and existence checks only
        match i32::try_from(pid) {
            Ok(raw) => kill(Pid::from_raw(raw), None::<NixSignal>).is_ok(),
            Err(_) => false,
        }
    }
}
