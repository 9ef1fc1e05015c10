//! Error types and Result aliases for shellcall

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for shellcall operations
pub type Result<T> = std::result::Result<T, Error>;

/// Exit code reported when a command name could not be resolved to a path
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit code reported when an executable exists but could not be started
pub const EXIT_CANNOT_START: i32 = 126;

/// The failure state of a single command execution
///
/// Carries everything the child produced before failing. `stdout` is the raw
/// captured text: unlike the success path it is never trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionError {
    /// The path of the command that failed
    pub invoked_path: PathBuf,
    /// The exit code of the command
    pub exit_code: i32,
    /// The standard output of the command
    pub stdout: String,
    /// The standard error output of the command
    pub stderr: String,
}

impl ExecutionError {
    /// Whether this failure means the executable could not be found
    pub fn is_not_found(&self) -> bool {
        self.exit_code == EXIT_NOT_FOUND
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} exited with error code {}.",
            self.invoked_path.display(),
            self.exit_code
        )
    }
}

impl std::error::Error for ExecutionError {}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The command could not be found (resolution failure or exit code 127)
    NotFound,
    /// The executable exists but could not be started
    LaunchFailed,
    /// The process ran and exited with a non-zero code
    NonZeroExit,
    /// The process was terminated after exceeding its time limit
    Timeout,
    /// Anything else (configuration, I/O plumbing)
    Other,
}

/// Main error type for shellcall
#[derive(Debug)]
pub enum Error {
    // === Execution errors ===
    /// Command name could not be resolved to an executable path
    ResolutionFailed {
        name: String,
    },

    /// Executable could not be started
    LaunchFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Process ran and exited with a non-zero code
    NonZeroExit(ExecutionError),

    /// Process exceeded its time limit and was terminated
    Timeout {
        path: PathBuf,
        duration: Duration,
    },

    /// Directory change was rejected by the resolution shell
    ChangeDirectoryFailed {
        path: PathBuf,
        reason: String,
    },

    /// A stream drain task did not complete
    DrainFailed {
        stream: &'static str,
        reason: String,
    },

    /// Failed to send signal to process
    SignalSendFailed {
        signal: String,
        reason: String,
    },

    /// Signal handling not supported on platform
    SignalNotSupported {
        signal: String,
        platform: String,
    },

    // === Configuration errors ===
    /// Failed to load configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Failed to parse configuration
    ConfigParseFailed {
        format: String,
        reason: String,
    },

    /// Configuration validation failed
    ConfigValidationFailed {
        field: String,
        reason: String,
    },

    /// Configuration file not found
    ConfigNotFound,

    // === I/O errors ===
    /// I/O errors
    Io(std::io::Error),

    // === Generic fallback (use sparingly) ===
    /// Generic errors
    Other(String),
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ResolutionFailed { .. } => ErrorKind::NotFound,
            Error::LaunchFailed { .. } => ErrorKind::LaunchFailed,
            Error::NonZeroExit(err) if err.is_not_found() => ErrorKind::NotFound,
            Error::NonZeroExit(_) => ErrorKind::NonZeroExit,
            Error::Timeout { .. } => ErrorKind::Timeout,
            _ => ErrorKind::Other,
        }
    }

    /// Whether the command could not be found
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Process-style exit code for execution failures
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::ResolutionFailed { .. } => Some(EXIT_NOT_FOUND),
            Error::LaunchFailed { .. } => Some(EXIT_CANNOT_START),
            Error::NonZeroExit(err) => Some(err.exit_code),
            _ => None,
        }
    }

    /// Uniform [`ExecutionError`] view of resolution, launch and exit failures
    pub fn execution_error(&self) -> Option<ExecutionError> {
        match self {
            Error::ResolutionFailed { name } => Some(ExecutionError {
                invoked_path: PathBuf::from("which"),
                exit_code: EXIT_NOT_FOUND,
                stdout: String::new(),
                stderr: format!("Unable to locate command '{}'", name),
            }),
            Error::LaunchFailed { path, source } => Some(ExecutionError {
                invoked_path: path.clone(),
                exit_code: EXIT_CANNOT_START,
                stdout: String::new(),
                stderr: source.to_string(),
            }),
            Error::NonZeroExit(err) => Some(err.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Execution errors
            Error::ResolutionFailed { name } => {
                write!(f, "Unable to locate command '{}'", name)
            }
            Error::LaunchFailed { path, source } => {
                write!(f, "Failed to launch '{}': {}", path.display(), source)
            }
            Error::NonZeroExit(err) => write!(f, "{}", err),
            Error::Timeout { path, duration } => {
                write!(f, "Command '{}' timed out after {:?}", path.display(), duration)
            }
            Error::ChangeDirectoryFailed { path, reason } => {
                write!(f, "Failed to change directory to '{}': {}", path.display(), reason)
            }
            Error::DrainFailed { stream, reason } => {
                write!(f, "Failed to drain {}: {}", stream, reason)
            }
            Error::SignalSendFailed { signal, reason } => {
                write!(f, "Failed to send signal '{}': {}", signal, reason)
            }
            Error::SignalNotSupported { signal, platform } => {
                write!(f, "Signal '{}' not supported on {}", signal, platform)
            }

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigParseFailed { format, reason } => {
                write!(f, "Failed to parse {} config: {}", format, reason)
            }
            Error::ConfigValidationFailed { field, reason } => {
                write!(f, "Configuration validation failed for '{}': {}", field, reason)
            }
            Error::ConfigNotFound => {
                write!(f, "Configuration file not found")
            }

            // I/O errors
            Error::Io(err) => write!(f, "I/O error: {}", err),

            // Generic fallback
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::LaunchFailed { source, .. } => Some(source),
            Error::NonZeroExit(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<ExecutionError> for Error {
    fn from(err: ExecutionError) -> Self {
        Error::NonZeroExit(err)
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
