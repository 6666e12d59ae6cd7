//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).
//!
//! ```toml
//! [parser]
//! ignore_full_paths = true
//!
//! [render]
//! indent = 2
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use bitconf_parser::{ParseOptions, RenderOptions};

use crate::{Args, error::CliError};

/// Options read from the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub parser: ParseOptions,
    pub render: RenderOptions,
}

impl AppConfig {
    /// Apply command-line overrides on top of the loaded values.
    pub fn with_overrides(mut self, args: &Args) -> Self {
        if args.ignore_full_paths {
            self.parser.ignore_full_paths = true;
        }
        if let Some(indent) = args.indent {
            self.render.indent = indent;
        }
        self
    }
}

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (bitconf/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, CliError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("bitconf/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "bitconf", "bitconf") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing fails
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, CliError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_explicit_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[parser]\nignore_full_paths = true\n\n[render]\nindent = 2\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(config.parser.ignore_full_paths);
        assert_eq!(config.render.indent, 2);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[render]\nindent = 8\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(!config.parser.ignore_full_paths);
        assert_eq!(config.render.indent, 8);
    }

    #[test]
    fn test_missing_explicit_config() {
        let err = load_config(Some("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("Missing configuration file"));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[render]\nindent = \"wide\"\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML configuration"));
    }

    #[test]
    fn test_cli_flags_override_config() {
        let args = Args::parse_from(["bitconf", "in.conf", "--ignore-full-paths", "--indent", "3"]);
        let config = AppConfig::default().with_overrides(&args);

        assert!(config.parser.ignore_full_paths);
        assert_eq!(config.render.indent, 3);
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let args = Args::parse_from(["bitconf", "in.conf"]);
        let loaded = AppConfig {
            parser: ParseOptions {
                ignore_full_paths: true,
            },
            render: RenderOptions { indent: 6 },
        };

        assert_eq!(loaded.clone().with_overrides(&args), loaded);
    }
}
