//! Working directory state
//!
//! Every launched process gets its own working directory, so a directory
//! change can never persist through a child. The session keeps its own belief
//! of the current directory here and hands it to each launch.
//!
//! There is one writer, the directory-change protocol in
//! [`crate::Session::change_directory`]. Everything else only reads.

use crate::config::SessionConfig;
use crate::error::Result;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// A session's logical current directory
#[derive(Debug)]
pub struct WorkingDirectory {
    current: RwLock<PathBuf>,
}

impl WorkingDirectory {
    /// Start at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            current: RwLock::new(path.into()),
        }
    }

    /// Start at the configured initial directory, or the host's current one
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let start = match config.initial_directory() {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir()?,
        };
        Ok(Self::new(start))
    }

    /// Snapshot of the current directory
    pub fn current(&self) -> PathBuf {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Record a new current directory
    pub(crate) fn set(&self, path: &Path) {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        debug!("Working directory {} -> {}", guard.display(), path.display());
        *guard = path.to_path_buf();
    }

    /// Independent copy starting where this one is now
    pub fn fork(&self) -> Self {
        Self::new(self.current())
    }
}
