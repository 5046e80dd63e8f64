//! Chart domain module.
//!
//! # Module Structure
//!
//! - `adapter`: pure mapping from a `QueryResult` to a renderer-ready `ChartSpec`
//! - `renderer`: the rendering capability the front end supplies

pub mod adapter;
pub mod renderer;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

pub use adapter::{ChartAdapter, ChartSeries, ChartSpec, PieSlice, SeriesData};
pub use renderer::ChartRenderer;

/// The chart shape the user asked for.
///
/// Parsed and displayed with lowercase names (`pie`, `bar`, `line`), which is
/// also the form sent to the backend as `chart_type`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ChartKind {
    #[default]
    Pie,
    Bar,
    Line,
}

impl ChartKind {
    /// Whether this kind plots values against a category axis.
    pub fn is_categorical(self) -> bool {
        !matches!(self, Self::Pie)
    }
}
