//! Command execution
//!
//! Runs one external program to completion: launch it directly, drain both
//! output pipes on their own tasks, wait for exit, and turn the result into
//! trimmed text or a structured error.
//!
//! The stdout drain, the stderr drain and the exit wait complete in any
//! order. Nothing is returned until all three have.

pub mod drain;
pub mod launcher;
pub mod resolver;

use crate::config::SessionConfig;
use crate::error::{Error, ExecutionError, Result};
use crate::platform::Platform;
use drain::{spawn_drain, ChunkLog, StreamType};
use launcher::{launch, LaunchRequest};
use std::future::Future;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::Child;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;

pub use resolver::{shell_quote, PathResolver, ShellResolver};

/// Time a terminated child gets to exit before it is killed
const TERMINATE_GRACE: Duration = Duration::from_millis(500);

/// Time allowed to drain and discard output after a timeout
const DISCARD_GRACE: Duration = Duration::from_secs(1);

/// Raw result of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Execute `path` with `args` in `working_directory`
///
/// Returns stdout trimmed per the config on exit code 0. Any other exit
/// yields [`Error::NonZeroExit`] with the untrimmed capture attached.
pub async fn execute(
    path: &Path,
    args: &[String],
    config: &SessionConfig,
    working_directory: &Path,
) -> Result<String> {
    let captured = run_to_completion(path, args, config, working_directory).await?;
    classify(path, captured, config)
}

/// Launch, drain and wait without classifying the exit code
pub async fn run_to_completion(
    path: &Path,
    args: &[String],
    config: &SessionConfig,
    working_directory: &Path,
) -> Result<CapturedOutput> {
    if config.xtrace() {
        info!(target: "shellcall::xtrace", "[shell] {} {:?}", path.display(), args);
    }

    let launched = launch(&LaunchRequest {
        path,
        args,
        environment: config.environment(),
        working_directory,
    })?;
    let mut child = launched.child;

    // Both drains run on their own tasks from here on, whether or not
    // anyone is waiting on the child yet
    let mut stdout_task = spawn_drain(
        launched.stdout,
        StreamType::Stdout,
        config.stdout_sink().clone(),
    );
    let mut stderr_task = spawn_drain(
        launched.stderr,
        StreamType::Stderr,
        config.stderr_sink().clone(),
    );

    // One deadline covers the exit wait and both drains, so descendants that
    // keep a pipe open cannot stretch the run past the limit
    let limit = config.timeout();
    let deadline = limit.map(|limit| Instant::now() + limit);
    let timed_out = || Error::Timeout {
        path: path.to_path_buf(),
        duration: limit.unwrap_or_default(),
    };

    let waited = within(deadline, child.wait()).await;
    let status = match waited {
        Some(Ok(status)) => status,
        Some(Err(e)) => {
            discard_drains(stdout_task, stderr_task).await;
            return Err(e.into());
        }
        None => {
            warn!("Process {:?} exceeded {:?}, terminating", child.id(), limit);
            if let Err(e) = terminate(&mut child).await {
                debug!("Termination after timeout failed: {}", e);
            }
            discard_drains(stdout_task, stderr_task).await;
            return Err(timed_out());
        }
    };

    let joined = within(deadline, async {
        let stdout = (&mut stdout_task).await;
        let stderr = (&mut stderr_task).await;
        (stdout, stderr)
    })
    .await;
    let Some((stdout, stderr)) = joined else {
        // The child is gone but something it started still holds a pipe
        warn!(
            "{} exited but its output stayed open past {:?}",
            path.display(),
            limit
        );
        discard_drains(stdout_task, stderr_task).await;
        return Err(timed_out());
    };

    let stdout = joined_log(stdout, StreamType::Stdout)?;
    let stderr = joined_log(stderr, StreamType::Stderr)?;
    let exit_code = exit_code(status);

    debug!(
        "{} exited with {} ({} stdout bytes, {} stderr bytes)",
        path.display(),
        exit_code,
        stdout.total_bytes(),
        stderr.total_bytes()
    );

    Ok(CapturedOutput {
        exit_code,
        stdout: stdout.into_text(),
        stderr: stderr.into_text(),
    })
}

/// Turn a finished process into the caller-facing outcome
pub fn classify(path: &Path, captured: CapturedOutput, config: &SessionConfig) -> Result<String> {
    if captured.exit_code == 0 {
        return Ok(config.output_trimming().trim(&captured.stdout).to_string());
    }

    Err(Error::NonZeroExit(ExecutionError {
        invoked_path: path.to_path_buf(),
        exit_code: captured.exit_code,
        stdout: captured.stdout,
        stderr: captured.stderr,
    }))
}

/// Run `future` to completion, or give up at `deadline`
async fn within<F: Future>(deadline: Option<Instant>, future: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, future).await.ok(),
        None => Some(future.await),
    }
}

/// Ask the child to exit, then force it
async fn terminate(child: &mut Child) -> Result<()> {
    if let Some(pid) = child.id() {
        let signals = Platform::signals();
        if !signals.is_process_running(pid) {
            child.wait().await?;
            return Ok(());
        }
        match signals.send_terminate(pid).await {
            Ok(()) => {
                if let Ok(status) = tokio::time::timeout(TERMINATE_GRACE, child.wait()).await {
                    status?;
                    return Ok(());
                }
            }
            Err(e) => debug!("Graceful termination unavailable: {}", e),
        }
    }

    if let Err(e) = child.start_kill() {
        debug!("Kill failed (process may already be gone): {}", e);
    }
    child.wait().await?;
    Ok(())
}

fn joined_log(
    joined: std::result::Result<ChunkLog, JoinError>,
    stream: StreamType,
) -> Result<ChunkLog> {
    joined.map_err(|e| Error::DrainFailed {
        stream: stream.as_str(),
        reason: e.to_string(),
    })
}

/// Let both drains finish so the pipes are released, dropping their output
async fn discard_drains(mut stdout_task: JoinHandle<ChunkLog>, mut stderr_task: JoinHandle<ChunkLog>) {
    let drained = tokio::time::timeout(DISCARD_GRACE, async {
        let _ = (&mut stdout_task).await;
        let _ = (&mut stderr_task).await;
    })
    .await;

    if drained.is_err() {
        // A descendant still holds a pipe open
        warn!("Output pipes still open after {:?}, abandoning drain", DISCARD_GRACE);
        stdout_task.abort();
        stderr_task.abort();
    }
}

/// Exit code, with signal deaths reported shell-style as 128 + signal
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}
