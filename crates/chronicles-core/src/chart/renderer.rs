//! Chart rendering capability.

use super::ChartSpec;
use crate::error::Result;

/// Turns a chart description into something the user can see.
///
/// Implementations own all drawing details. Callers only hand over a spec
/// once a result exists; a renderer is never asked to draw "no chart".
pub trait ChartRenderer: Send + Sync {
    fn render(&self, spec: &ChartSpec) -> Result<String>;
}
