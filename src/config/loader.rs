//! Configuration File Loading
//!
//! Finds and parses session settings from TOML or JSON files.

use super::{ConfigFile, SessionConfig};
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SHELLCALL_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Pick a format from a file extension; anything unknown is read as TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }

    fn name(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Configuration file loader
pub struct ConfigLoader {
    /// Base paths (without extension) searched in order
    search_paths: Vec<PathBuf>,
    /// Supported configuration file formats
    supported_formats: Vec<ConfigFormat>,
}

impl ConfigLoader {
    /// Loader over the default search paths
    pub fn new() -> Self {
        Self::with_search_paths(Self::default_search_paths())
    }

    /// Loader over explicit base paths
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            supported_formats: vec![ConfigFormat::Toml, ConfigFormat::Json],
        }
    }

    /// Load from `$SHELLCALL_CONFIG` or the default search paths
    pub fn load() -> Result<SessionConfig> {
        if let Some(path) = env::var_os(CONFIG_ENV_VAR) {
            return Self::load_from_path(Path::new(&path));
        }
        Self::new().find()
    }

    /// Like [`ConfigLoader::load`], falling back to defaults on any failure
    pub fn load_or_default() -> SessionConfig {
        match Self::load() {
            Ok(config) => config,
            Err(Error::ConfigNotFound) => {
                debug!("No configuration file found, using defaults");
                SessionConfig::default()
            }
            Err(e) => {
                warn!("Failed to load configuration: {}. Using defaults", e);
                SessionConfig::default()
            }
        }
    }

    /// Load and validate one specific file
    pub fn load_from_path(path: &Path) -> Result<SessionConfig> {
        if !path.exists() {
            return Err(Error::ConfigLoadFailed {
                path: path.to_path_buf(),
                reason: "Configuration file does not exist".to_string(),
            });
        }
        let file = Self::read_file(path, ConfigFormat::from_path(path))?;
        Self::finish(file)
    }

    /// Parse settings from a string
    pub fn parse(content: &str, format: ConfigFormat) -> Result<ConfigFile> {
        match format {
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| Error::ConfigParseFailed {
                format: format.name().to_string(),
                reason: e.to_string(),
            }),
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|e| Error::ConfigParseFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// First loadable file on the search paths
    pub fn find(&self) -> Result<SessionConfig> {
        for base in &self.search_paths {
            for format in &self.supported_formats {
                let path = base.with_extension(format.extension());
                if !path.exists() {
                    continue;
                }
                match Self::read_file(&path, *format) {
                    Ok(file) => {
                        info!("Configuration loaded from {}", path.display());
                        return Self::finish(file);
                    }
                    Err(e) => {
                        // Keep searching; a broken file should not mask a later one
                        warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }
        Err(Error::ConfigNotFound)
    }

    fn read_file(path: &Path, format: ConfigFormat) -> Result<ConfigFile> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&content, format)
    }

    fn finish(file: ConfigFile) -> Result<SessionConfig> {
        file.validate().map_err(|e| Error::ConfigValidationFailed {
            field: e.field().to_string(),
            reason: e.to_string(),
        })?;
        Ok(file.into_session_config())
    }

    /// Default base paths for configuration files
    fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("shellcall").join("config"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".shellcall"));
        }

        if let Ok(cwd) = env::current_dir() {
            paths.push(cwd.join("shellcall"));
        }

        paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
