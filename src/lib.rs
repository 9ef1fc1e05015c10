//! shellcall - Run external programs as typed operations
//!
//! This library lets a host program invoke external executables the way it
//! would call a function: output is captured, failures come back as
//! structured errors, and a working directory persists across calls the way
//! it does in a shell.
//!
//! ## Features
//!
//! - **Deadlock-free capture:** stdout and stderr are drained concurrently
//!   while the child runs, so neither pipe can fill up and stall it
//! - **Ordered reassembly:** chunks are stitched back together by per-stream
//!   sequence number
//! - **Live echo:** every chunk can be forwarded to an [`OutputSink`]
//! - **Persistent directory:** `cd` is emulated per session
//! - **Environment control:** inherit, overlay or replace the host environment
//! - **Configuration:** builder API plus TOML/JSON configuration files
//!
//! ## Module Organization
//!
//! - [`session`] - Sessions: registry, working directory, `run`
//! - [`execution`] - Resolution, launch, draining and outcome classification
//! - [`commands`] - Command registry and resolved commands
//! - [`state`] - Per-session working directory
//! - [`config`] - Session configuration and config file loading
//! - [`output`] - Output sinks
//! - [`platform`] - Signal delivery for timeouts
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use shellcall::{Session, SessionConfig};
//!
//! # async fn demo() -> shellcall::Result<()> {
//! let session = Session::new(SessionConfig::quiet())?;
//! session.run("cd", &["/tmp".to_string()]).await?;
//! let listing = session.run("ls", &["-la".to_string()]).await?;
//! for line in shellcall::output::lines(&listing) {
//!     println!("{}", line);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Exit codes
//!
//! - `0` - success, trimmed stdout is returned
//! - `126` - the executable exists but could not be started
//! - `127` - the command could not be found
//! - anything else - [`Error::NonZeroExit`] with the untrimmed output

#![allow(unexpected_cfgs)]

#[macro_use]
extern crate tracing;

pub mod commands;
pub mod config;
pub mod error;
pub mod execution;
pub mod output;
pub mod platform;
pub mod session;
pub mod state;

// Re-exports for core functionality
pub use commands::{CommandKind, ResolvedCommand};
pub use config::{Environment, OutputTrimming, SessionConfig};
pub use error::{Error, ErrorKind, ExecutionError, Result};
pub use execution::{execute, PathResolver, ShellResolver};
pub use output::{DiscardSink, MemorySink, OutputSink, StderrSink, StdoutSink};
pub use session::Session;

// Convenience re-exports
pub use config::loader::ConfigLoader;

// Version information
/// The current version of shellcall from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The library name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// The library description from Cargo.toml
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Create a session from the default configuration files
///
/// Looks for a configuration file in the standard locations (see
/// [`ConfigLoader`]) and falls back to [`SessionConfig::default`] when none
/// is found or it cannot be read.
///
/// # Errors
///
/// Fails only if the host's current directory cannot be determined and no
/// initial directory is configured.
pub fn init() -> Result<Session> {
    info!("Initializing {} v{}", NAME, VERSION);
    let config = ConfigLoader::load_or_default();
    Session::new(config)
}

/// Create a session from a specific configuration file
pub fn init_with_config(path: &std::path::Path) -> Result<Session> {
    info!("Initializing {} v{} from {}", NAME, VERSION, path.display());
    let config = ConfigLoader::load_from_path(path)?;
    Session::new(config)
}
