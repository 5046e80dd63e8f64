//! Client configuration model.
//!
//! Every field has a default, so a missing or partial `config.toml` still
//! yields a usable configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chart::ChartKind;
use crate::view::{ViewMode, ViewModeController};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5100";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub view: ViewSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BackendSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendSettings {
    /// Per-request timeout. A configured `0` is raised to one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn default_base_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Presentation the client starts with.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewSettings {
    #[serde(default)]
    pub mode: ViewMode,
    #[serde(default)]
    pub chart_kind: ChartKind,
}

impl ViewSettings {
    pub fn controller(&self) -> ViewModeController {
        ViewModeController::new(self.mode, self.chart_kind)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
