//! Path management for chronicles configuration and logs.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/chronicles/        # Config directory (platform config dir)
//! ├── config.toml              # Client configuration
//! └── logs/                    # Application logs
//!     └── chronicles.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

const APP_DIR: &str = "chronicles";

/// Resolves where chronicles keeps its files.
///
/// A root override (used by tests and `--config`) replaces the platform
/// config directory entirely.
#[derive(Debug, Clone, Default)]
pub struct ChroniclesPaths {
    root: Option<PathBuf>,
}

impl ChroniclesPaths {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Returns the chronicles configuration directory.
    ///
    /// - `Ok(PathBuf)`: e.g. `~/.config/chronicles/`
    /// - `Err(PathError::ConfigDirNotFound)`: no platform config dir
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    /// Returns the path to the main configuration file.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the directory log files are written to.
    pub fn log_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}
