//! Domain layer of the Crime Chronicles client.
//!
//! Pure state and mapping logic: no I/O happens in this crate. Transports
//! implement [`api::CrimeBackend`], renderers implement
//! [`chart::ChartRenderer`], and the application layer drives the flows held
//! in [`app_state::AppState`].

pub mod api;
pub mod app_state;
pub mod chart;
pub mod config;
pub mod error;
pub mod history;
pub mod query;
pub mod session;
pub mod view;

// Re-export common error type
pub use error::{ChroniclesError, Result};

pub use app_state::{AppState, Presentation};
pub use chart::{ChartAdapter, ChartKind, ChartRenderer, ChartSpec};
pub use view::{ViewMode, ViewModeController};
