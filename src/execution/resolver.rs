//! Command path resolution
//!
//! Maps a bare command name to the absolute path the resolution shell would
//! run for it. Results are not cached here; the session registry does that.

use super::execute;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Resolves command names to executable paths
#[async_trait]
pub trait PathResolver: Send + Sync {
    /// Absolute path for `name`, or [`Error::ResolutionFailed`]
    async fn resolve(
        &self,
        name: &str,
        config: &SessionConfig,
        working_directory: &Path,
    ) -> Result<PathBuf>;
}

/// Asks the configured resolution shell, `which`-style
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellResolver;

impl ShellResolver {
    pub fn new() -> Self {
        Self
    }

    /// The `-c` expression used to look `name` up
    pub fn lookup_expression(name: &str) -> String {
        let quoted = shell_quote(name);
        format!("which {} 2>/dev/null || command -v {}", quoted, quoted)
    }
}

#[async_trait]
impl PathResolver for ShellResolver {
    async fn resolve(
        &self,
        name: &str,
        config: &SessionConfig,
        working_directory: &Path,
    ) -> Result<PathBuf> {
        let not_found = || Error::ResolutionFailed {
            name: name.to_string(),
        };

        if name.trim().is_empty() {
            return Err(not_found());
        }

        let args = vec!["-c".to_string(), Self::lookup_expression(name)];
        let output = match execute(
            config.resolution_shell(),
            &args,
            &config.plumbing(),
            working_directory,
        )
        .await
        {
            Ok(output) => output,
            Err(e) => {
                debug!("Resolution of '{}' failed: {}", name, e);
                return Err(not_found());
            }
        };

        // Builtins resolve to their bare name; only a real path is usable
        let path = output
            .lines()
            .map(str::trim)
            .find(|line| Path::new(line).is_absolute())
            .map(PathBuf::from)
            .ok_or_else(not_found)?;

        debug!("Resolved '{}' to {}", name, path.display());
        Ok(path)
    }
}

/// Quote `value` as one single-quoted POSIX shell word
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
