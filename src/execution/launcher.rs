//! Process launching
//!
//! Starts a child directly (no shell interposed) with both output streams
//! piped and stdin closed.

use crate::config::Environment;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};

/// Everything needed to start one process
#[derive(Debug, Clone)]
pub struct LaunchRequest<'a> {
    pub path: &'a Path,
    pub args: &'a [String],
    pub environment: &'a Environment,
    pub working_directory: &'a Path,
}

/// A started child and its output pipes
#[derive(Debug)]
pub struct LaunchedProcess {
    pub child: Child,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
}

impl LaunchedProcess {
    /// OS process id, while the child has not been reaped
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }
}

/// Start the process described by `request`
///
/// Fails with [`Error::LaunchFailed`] when the OS refuses to start it
/// (missing file, permissions, not executable, bad working directory).
pub fn launch(request: &LaunchRequest<'_>) -> Result<LaunchedProcess> {
    let mut command = Command::new(request.path);
    command
        .args(request.args)
        .current_dir(request.working_directory)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if request.environment.clears_host() {
        command.env_clear();
    }
    if let Some(vars) = request.environment.explicit_vars() {
        command.envs(vars);
    }

    let mut child = command
        .spawn()
        .map_err(|source| launch_failed(request.path, source))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| launch_failed(request.path, std::io::Error::other("stdout was not piped")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| launch_failed(request.path, std::io::Error::other("stderr was not piped")))?;

    debug!(
        "Launched {} (pid {:?}) in {}",
        request.path.display(),
        child.id(),
        request.working_directory.display()
    );

    Ok(LaunchedProcess {
        child,
        stdout,
        stderr,
    })
}

fn launch_failed(path: &Path, source: std::io::Error) -> Error {
    Error::LaunchFailed {
        path: PathBuf::from(path),
        source,
    }
}
