//! Sessions
//!
//! A [`Session`] is the context a sequence of commands runs under: one
//! configuration, one logical working directory and a registry of resolved
//! command paths. Callers own it and pass it around explicitly.

use crate::commands::{expand_tilde, CommandKind, CommandRegistry, RegistryEntry, ResolvedCommand};
use crate::config::{OutputTrimming, SessionConfig};
use crate::error::{Error, Result};
use crate::execution::{self, shell_quote, PathResolver, ShellResolver};
use crate::state::WorkingDirectory;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configured context for running external commands
pub struct Session {
    config: SessionConfig,
    registry: CommandRegistry,
    resolver: Arc<dyn PathResolver>,
    working_directory: WorkingDirectory,
}

impl Session {
    /// Session resolving names through the configured resolution shell
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::with_resolver(config, Arc::new(ShellResolver::new()))
    }

    /// Session with a custom resolver
    pub fn with_resolver(config: SessionConfig, resolver: Arc<dyn PathResolver>) -> Result<Self> {
        let working_directory = WorkingDirectory::from_config(&config)?;
        let registry = CommandRegistry::with_builtins(&config);
        info!(
            "Session started in {} (shell {})",
            working_directory.current().display(),
            config.resolution_shell().display()
        );

        Ok(Self {
            config,
            registry,
            resolver,
            working_directory,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The directory the next command will run in
    pub fn current_directory(&self) -> PathBuf {
        self.working_directory.current()
    }

    /// Absolute path for `name`
    ///
    /// Names containing a `/` are taken as paths and not resolved. Anything
    /// else is looked up once per registry and cached.
    pub async fn resolve(&self, name: &str) -> Result<PathBuf> {
        Ok(self.entry(name).await?.path)
    }

    /// Registry command for `name`, bound to this session's configuration
    pub async fn command(&self, name: &str) -> Result<ResolvedCommand> {
        let entry = self.entry(name).await?;
        Ok(ResolvedCommand::with_kind(
            name,
            entry.path,
            entry.kind,
            self.config.clone(),
        ))
    }

    /// Install a command with a known path, replacing any cached entry
    ///
    /// The command runs under this session's configuration when invoked
    /// through [`Session::run`].
    pub async fn use_command(&self, command: ResolvedCommand) {
        debug!(
            "Using {} for '{}'",
            command.path().display(),
            command.name()
        );
        self.registry
            .insert(
                command.name(),
                RegistryEntry {
                    path: command.path().to_path_buf(),
                    kind: command.kind(),
                },
            )
            .await;
    }

    /// Run the command registered under `name`
    ///
    /// For `cd` the result is the new working directory.
    pub async fn run(&self, name: &str, args: &[String]) -> Result<String> {
        let entry = self.entry(name).await?;
        match entry.kind {
            CommandKind::Execute => self.execute(&entry.path, args).await,
            CommandKind::ChangeDirectory => {
                let target = match args.first() {
                    Some(arg) => expand_tilde(arg),
                    None => dirs::home_dir().ok_or_else(|| Error::ChangeDirectoryFailed {
                        path: PathBuf::from("~"),
                        reason: "home directory is unknown".to_string(),
                    })?,
                };
                let dir = self.change_directory(&target).await?;
                Ok(dir.to_string_lossy().into_owned())
            }
        }
    }

    /// Execute `path` directly in the current directory
    pub async fn execute(&self, path: &Path, args: &[String]) -> Result<String> {
        let cwd = self.working_directory.current();
        execution::execute(path, args, &self.config, &cwd).await
    }

    /// Change the session's working directory
    ///
    /// The resolution shell performs the change relative to the current
    /// directory and reports where it ended up; that path becomes the
    /// directory for every later launch. `~` is not expanded here.
    pub async fn change_directory(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let failed = |reason: String| Error::ChangeDirectoryFailed {
            path: path.to_path_buf(),
            reason,
        };

        let script = format!("cd {} && pwd", shell_quote(&path.to_string_lossy()));
        let args = vec!["-c".to_string(), script];
        let cwd = self.working_directory.current();

        // Directory names may end in whitespace; only the newline `pwd` adds is noise
        let plumbing = self.config.plumbing().with_output_trimming(OutputTrimming::None);
        let output = execution::execute(self.config.resolution_shell(), &args, &plumbing, &cwd)
            .await
            .map_err(|e| match e.execution_error() {
                Some(view) if !view.stderr.trim().is_empty() => {
                    failed(view.stderr.trim().to_string())
                }
                _ => failed(e.to_string()),
            })?;

        let reported = output.strip_suffix('\n').unwrap_or(&output);
        let reported = reported.rsplit('\n').next().unwrap_or(reported);
        let new_dir = PathBuf::from(reported);
        if !new_dir.is_absolute() || !new_dir.is_dir() {
            return Err(failed(format!("shell reported {:?}", output)));
        }

        self.working_directory.set(&new_dir);
        Ok(new_dir)
    }

    /// New session whose children see this environment plus `overlay`
    ///
    /// The fork shares the command registry and starts in this session's
    /// current directory, but later directory changes stay local to each.
    pub fn fork_with_environment<I, K, V>(&self, overlay: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            config: self.config.clone().with_added_environment(overlay),
            registry: self.registry.clone(),
            resolver: Arc::clone(&self.resolver),
            working_directory: self.working_directory.fork(),
        }
    }

    async fn entry(&self, name: &str) -> Result<RegistryEntry> {
        let cwd = self.working_directory.current();
        if name.contains('/') {
            // Relative paths are relative to the session, not the host process
            return Ok(RegistryEntry {
                path: cwd.join(name.trim()),
                kind: CommandKind::Execute,
            });
        }

        self.registry
            .get_or_resolve(name, self.resolver.as_ref(), &self.config, &cwd)
            .await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("working_directory", &self.working_directory.current())
            .finish_non_exhaustive()
    }
}
