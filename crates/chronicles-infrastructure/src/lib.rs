//! Infrastructure layer: the HTTP backend client, configuration loading and
//! filesystem paths.

pub mod config_service;
pub mod http_backend;
pub mod paths;

pub use config_service::{ConfigService, ConfigSource};
pub use http_backend::HttpCrimeBackend;
pub use paths::ChroniclesPaths;
