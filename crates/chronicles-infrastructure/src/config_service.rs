//! Configuration service implementation.
//!
//! Loads `ClientConfig` from `config.toml`, applies environment overrides and
//! caches the result.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chronicles_core::config::ClientConfig;
use chronicles_core::{ChroniclesError, Result};

use crate::paths::ChroniclesPaths;

/// Overrides `backend.base_url`.
pub const ENV_BACKEND_URL: &str = "CHRONICLES_BACKEND_URL";
/// Overrides `logging.level`.
pub const ENV_LOG_LEVEL: &str = "CHRONICLES_LOG_LEVEL";

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => write!(f, "defaults"),
        }
    }
}

/// Configuration service that loads and caches the client configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading the default `config.toml` location.
    pub fn from_paths(paths: &ChroniclesPaths) -> Result<Self> {
        let path = paths
            .config_file()
            .map_err(|e| ChroniclesError::config(e.to_string()))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reports whether `get_config` reads the file or falls back to defaults.
    ///
    /// Lets callers log the outcome once their subscriber is installed, since
    /// the first load usually happens before logging is configured.
    pub fn source(&self) -> ConfigSource {
        if self.path.exists() {
            ConfigSource::File(self.path.clone())
        } else {
            ConfigSource::Defaults
        }
    }

    /// Gets the configuration, loading it on first access.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn get_config(&self) -> Result<ClientConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|e| ChroniclesError::internal(format!("config lock poisoned: {e}")))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let env: HashMap<String, String> = std::env::vars().collect();
        let loaded = apply_env_overrides(Self::load_file(&self.path)?, &env);

        let mut write_lock = self
            .config
            .write()
            .map_err(|e| ChroniclesError::internal(format!("config lock poisoned: {e}")))?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_file(path: &Path) -> Result<ClientConfig> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(ClientConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

/// Applies `CHRONICLES_*` overrides from `env`. Blank values are ignored.
pub fn apply_env_overrides(mut config: ClientConfig, env: &HashMap<String, String>) -> ClientConfig {
    let non_blank = |key: &str| env.get(key).filter(|value| !value.trim().is_empty());

    if let Some(url) = non_blank(ENV_BACKEND_URL) {
        config.backend.base_url = url.trim().to_string();
    }
    if let Some(level) = non_blank(ENV_LOG_LEVEL) {
        config.logging.level = level.trim().to_string();
    }
    config
}
