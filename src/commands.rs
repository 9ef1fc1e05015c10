//! Command registry
//!
//! Maps command names to resolved executables. Most commands just execute;
//! `cd` is the one command whose behavior is built in, because a child
//! process cannot change its parent's directory.

use crate::config::SessionConfig;
use crate::error::Result;
use crate::execution::{self, PathResolver};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Name under which the directory-change command is registered
pub const CHANGE_DIRECTORY: &str = "cd";

/// How a registered command behaves when run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Launch the executable with the given arguments
    Execute,
    /// Change the session's working directory
    ChangeDirectory,
}

/// A command name bound to an executable path and a configuration
#[derive(Debug, Clone)]
pub struct ResolvedCommand {
    name: String,
    path: PathBuf,
    kind: CommandKind,
    config: SessionConfig,
}

impl ResolvedCommand {
    /// A generic command with a known path; no resolution happens
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>, config: SessionConfig) -> Self {
        Self::with_kind(name, path, CommandKind::Execute, config)
    }

    /// The built-in directory-change command for `config`
    pub fn change_directory(config: SessionConfig) -> Self {
        let shell = config.resolution_shell().to_path_buf();
        Self::with_kind(CHANGE_DIRECTORY, shell, CommandKind::ChangeDirectory, config)
    }

    pub(crate) fn with_kind(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        kind: CommandKind,
        config: SessionConfig,
    ) -> Self {
        Self {
            name: name.into(),
            path: trim_path(path.as_ref()),
            kind,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Same command, run under a different configuration
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Execute this command directly with its own configuration
    ///
    /// Only meaningful for [`CommandKind::Execute`]; directory changes need a
    /// session to record the new directory and go through
    /// [`crate::Session::run`].
    pub async fn execute(&self, args: &[String], working_directory: &Path) -> Result<String> {
        execution::execute(&self.path, args, &self.config, working_directory).await
    }
}

/// Registry entry shared between a session and its forks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub path: PathBuf,
    pub kind: CommandKind,
}

/// Memoized name → path mapping
///
/// Clones share the same map. Forked sessions hold clones, so a command
/// resolved in one is never resolved again in another.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    entries: Arc<Mutex<HashMap<String, RegistryEntry>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `cd` entry
    pub fn with_builtins(config: &SessionConfig) -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            CHANGE_DIRECTORY.to_string(),
            RegistryEntry {
                path: config.resolution_shell().to_path_buf(),
                kind: CommandKind::ChangeDirectory,
            },
        );
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Install or replace an entry
    pub async fn insert(&self, name: impl Into<String>, entry: RegistryEntry) {
        self.entries.lock().await.insert(name.into(), entry);
    }

    /// Cached entry, if any
    pub async fn get(&self, name: &str) -> Option<RegistryEntry> {
        self.entries.lock().await.get(name).cloned()
    }

    /// Cached entry for `name`, resolving and caching it on first use
    ///
    /// The lock is held across resolution so concurrent lookups of the same
    /// name resolve it once.
    pub async fn get_or_resolve(
        &self,
        name: &str,
        resolver: &dyn PathResolver,
        config: &SessionConfig,
        working_directory: &Path,
    ) -> Result<RegistryEntry> {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get(name) {
            return Ok(entry.clone());
        }

        let path = resolver.resolve(name, config, working_directory).await?;
        let entry = RegistryEntry {
            path,
            kind: CommandKind::Execute,
        };
        entries.insert(name.to_string(), entry.clone());
        Ok(entry)
    }

    /// Number of known commands
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Strip whitespace around a path given as text
fn trim_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(text) if text.trim() != text => PathBuf::from(text.trim()),
        _ => path.to_path_buf(),
    }
}
