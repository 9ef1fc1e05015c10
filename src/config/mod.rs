//! Session configuration
//!
//! [`SessionConfig`] is the immutable record of behavioral options threaded
//! through resolution, launch and draining. Every `with_*` method consumes the
//! value and returns a new one, so a forked session can carry a different
//! environment while sharing everything else.
//!
//! [`ConfigFile`] is the serde form that can be read from disk by
//! [`loader::ConfigLoader`].

pub mod loader;

use crate::output::{DiscardSink, SharedSink, StderrSink, StdoutSink};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Default shell used for resolution and directory changes
pub const DEFAULT_RESOLUTION_SHELL: &str = "/bin/sh";

/// Characters stripped from both ends of successful output
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTrimming {
    /// Keep output exactly as captured
    None,
    /// Strip Unicode whitespace and newlines
    #[default]
    Whitespace,
    /// Strip exactly these characters
    Characters(BTreeSet<char>),
}

impl OutputTrimming {
    /// Build from a config value: `"whitespace"`, `"none"` or a literal set of characters
    pub fn from_setting(setting: &str) -> Self {
        match setting {
            "whitespace" => OutputTrimming::Whitespace,
            "none" | "" => OutputTrimming::None,
            chars => OutputTrimming::Characters(chars.chars().collect()),
        }
    }

    /// Trim `text` from both ends
    pub fn trim<'a>(&self, text: &'a str) -> &'a str {
        match self {
            OutputTrimming::None => text,
            OutputTrimming::Whitespace => text.trim(),
            OutputTrimming::Characters(set) => text.trim_matches(|c: char| set.contains(&c)),
        }
    }
}

/// Environment handed to launched processes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    /// Use the host process' environment
    #[default]
    Inherit,
    /// Host environment plus these variables (overlay wins)
    Overlay(BTreeMap<String, String>),
    /// Exactly these variables and nothing else
    Exact(BTreeMap<String, String>),
}

impl Environment {
    /// The full set of variables a child would see
    pub fn resolve(&self) -> BTreeMap<String, String> {
        match self {
            Environment::Inherit => host_environment(),
            Environment::Overlay(extra) => {
                let mut vars = host_environment();
                vars.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
                vars
            }
            Environment::Exact(vars) => vars.clone(),
        }
    }

    /// Whether the host environment must be cleared before launch
    pub fn clears_host(&self) -> bool {
        matches!(self, Environment::Exact(_))
    }

    /// Variables set on top of the (possibly cleared) base environment
    pub fn explicit_vars(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Environment::Inherit => None,
            Environment::Overlay(vars) | Environment::Exact(vars) => Some(vars),
        }
    }
}

fn host_environment() -> BTreeMap<String, String> {
    // Non-unicode entries cannot be represented in the map and are skipped
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Immutable per-session behavioral options
#[derive(Clone)]
pub struct SessionConfig {
    output_trimming: OutputTrimming,
    resolution_shell: PathBuf,
    environment: Environment,
    stdout_sink: SharedSink,
    stderr_sink: SharedSink,
    xtrace: bool,
    timeout: Option<Duration>,
    initial_directory: Option<PathBuf>,
    replace_underscores_with_dashes: bool,
    replace_capitalized_param_underscores_with_dashes: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            output_trimming: OutputTrimming::Whitespace,
            resolution_shell: PathBuf::from(DEFAULT_RESOLUTION_SHELL),
            environment: Environment::Inherit,
            stdout_sink: Arc::new(StdoutSink),
            stderr_sink: Arc::new(StderrSink),
            xtrace: false,
            timeout: None,
            initial_directory: None,
            replace_underscores_with_dashes: true,
            replace_capitalized_param_underscores_with_dashes: false,
        }
    }
}

impl SessionConfig {
    /// Default configuration: echo both streams, trim whitespace, inherit environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with both echo sinks discarding
    pub fn quiet() -> Self {
        Self::default()
            .with_stdout_sink(Arc::new(DiscardSink))
            .with_stderr_sink(Arc::new(DiscardSink))
    }

    /// Configuration for internal shell plumbing (resolution, directory change)
    ///
    /// Keeps the resolution shell and timeout, but never echoes, never traces,
    /// and always runs with the host environment.
    pub fn plumbing(&self) -> Self {
        Self::quiet()
            .with_resolution_shell(self.resolution_shell.clone())
            .with_timeout(self.timeout)
    }

    pub fn with_output_trimming(mut self, trimming: OutputTrimming) -> Self {
        self.output_trimming = trimming;
        self
    }

    pub fn with_resolution_shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.resolution_shell = shell.into();
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Merge the effective environment with `overlay` into an exact environment
    pub fn with_added_environment<I, K, V>(self, overlay: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars = self.environment.resolve();
        vars.extend(overlay.into_iter().map(|(k, v)| (k.into(), v.into())));
        self.with_environment(Environment::Exact(vars))
    }

    pub fn with_stdout_sink(mut self, sink: SharedSink) -> Self {
        self.stdout_sink = sink;
        self
    }

    pub fn with_stderr_sink(mut self, sink: SharedSink) -> Self {
        self.stderr_sink = sink;
        self
    }

    pub fn with_xtrace(mut self, xtrace: bool) -> Self {
        self.xtrace = xtrace;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_initial_directory(mut self, dir: Option<PathBuf>) -> Self {
        self.initial_directory = dir;
        self
    }

    pub fn with_argument_formatting(mut self, underscores: bool, capitalized: bool) -> Self {
        self.replace_underscores_with_dashes = underscores;
        self.replace_capitalized_param_underscores_with_dashes = capitalized;
        self
    }

    pub fn output_trimming(&self) -> &OutputTrimming {
        &self.output_trimming
    }

    pub fn resolution_shell(&self) -> &Path {
        &self.resolution_shell
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn stdout_sink(&self) -> &SharedSink {
        &self.stdout_sink
    }

    pub fn stderr_sink(&self) -> &SharedSink {
        &self.stderr_sink
    }

    pub fn xtrace(&self) -> bool {
        self.xtrace
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn initial_directory(&self) -> Option<&Path> {
        self.initial_directory.as_deref()
    }

    /// Whether argument names should have underscores replaced with dashes
    ///
    /// Carried for the call-syntax layer; the execution engine ignores it.
    pub fn replace_underscores_with_dashes(&self) -> bool {
        self.replace_underscores_with_dashes
    }

    /// Whether fully capitalized argument names should also get dashes
    pub fn replace_capitalized_param_underscores_with_dashes(&self) -> bool {
        self.replace_capitalized_param_underscores_with_dashes
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("output_trimming", &self.output_trimming)
            .field("resolution_shell", &self.resolution_shell)
            .field("environment", &self.environment)
            .field("xtrace", &self.xtrace)
            .field("timeout", &self.timeout)
            .field("initial_directory", &self.initial_directory)
            .field("stdout_sink", &self.stdout_sink.kind())
            .field("stderr_sink", &self.stderr_sink.kind())
            .finish()
    }
}

/// How the environment section of a config file is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentMode {
    #[default]
    Inherit,
    Overlay,
    Exact,
}

/// Environment section of a config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSection {
    pub mode: EnvironmentMode,
    pub vars: BTreeMap<String, String>,
}

/// On-disk session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Shell used with `-c` for resolution and directory changes
    pub resolution_shell: PathBuf,
    /// `"whitespace"`, `"none"` or a literal list of characters to strip
    pub trim: String,
    /// Echo child stdout to our stdout while it runs
    pub echo_stdout: bool,
    /// Echo child stderr to our stderr while it runs
    pub echo_stderr: bool,
    /// Log each invocation before running it
    pub xtrace: bool,
    /// Per-execution time limit in milliseconds
    pub timeout_ms: Option<u64>,
    /// Starting directory for new sessions (defaults to the process directory)
    pub initial_directory: Option<PathBuf>,
    pub environment: EnvironmentSection,
    pub replace_underscores_with_dashes: bool,
    pub replace_capitalized_param_underscores_with_dashes: bool,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            resolution_shell: PathBuf::from(DEFAULT_RESOLUTION_SHELL),
            trim: "whitespace".to_string(),
            echo_stdout: true,
            echo_stderr: true,
            xtrace: false,
            timeout_ms: None,
            initial_directory: None,
            environment: EnvironmentSection::default(),
            replace_underscores_with_dashes: true,
            replace_capitalized_param_underscores_with_dashes: false,
        }
    }
}

impl ConfigFile {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution_shell.as_os_str().is_empty() {
            return Err(ConfigError::EmptyShellPath);
        }
        if !self.resolution_shell.is_absolute() {
            return Err(ConfigError::RelativeShellPath(self.resolution_shell.clone()));
        }
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        if let Some(dir) = &self.initial_directory {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeInitialDirectory(dir.clone()));
            }
        }
        if self.environment.mode == EnvironmentMode::Inherit && !self.environment.vars.is_empty() {
            return Err(ConfigError::VarsWithInherit(self.environment.vars.len()));
        }
        Ok(())
    }

    /// Build the runtime configuration
    pub fn into_session_config(self) -> SessionConfig {
        let environment = match self.environment.mode {
            EnvironmentMode::Inherit => Environment::Inherit,
            EnvironmentMode::Overlay => Environment::Overlay(self.environment.vars),
            EnvironmentMode::Exact => Environment::Exact(self.environment.vars),
        };
        let stdout_sink: SharedSink = if self.echo_stdout {
            Arc::new(StdoutSink)
        } else {
            Arc::new(DiscardSink)
        };
        let stderr_sink: SharedSink = if self.echo_stderr {
            Arc::new(StderrSink)
        } else {
            Arc::new(DiscardSink)
        };

        SessionConfig::new()
            .with_output_trimming(OutputTrimming::from_setting(&self.trim))
            .with_resolution_shell(self.resolution_shell)
            .with_environment(environment)
            .with_stdout_sink(stdout_sink)
            .with_stderr_sink(stderr_sink)
            .with_xtrace(self.xtrace)
            .with_timeout(self.timeout_ms.map(Duration::from_millis))
            .with_initial_directory(self.initial_directory)
            .with_argument_formatting(
                self.replace_underscores_with_dashes,
                self.replace_capitalized_param_underscores_with_dashes,
            )
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Resolution shell path cannot be empty")]
    EmptyShellPath,

    #[error("Resolution shell must be an absolute path: {0}")]
    RelativeShellPath(PathBuf),

    #[error("Timeout must be greater than 0 ms")]
    ZeroTimeout,

    #[error("Initial directory must be an absolute path: {0}")]
    RelativeInitialDirectory(PathBuf),

    #[error("{0} environment variables given with mode 'inherit' (use 'overlay' or 'exact')")]
    VarsWithInherit(usize),
}

impl ConfigError {
    /// Config field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::EmptyShellPath | ConfigError::RelativeShellPath(_) => "resolution_shell",
            ConfigError::ZeroTimeout => "timeout_ms",
            ConfigError::RelativeInitialDirectory(_) => "initial_directory",
            ConfigError::VarsWithInherit(_) => "environment.vars",
        }
    }
}
