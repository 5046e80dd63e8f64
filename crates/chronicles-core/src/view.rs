//! View mode controller.
//!
//! Holds how results are presented (chart or text) and which chart kind is
//! selected. Changes here are local state only; nothing here talks to the
//! backend.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::chart::ChartKind;

/// The user's chosen presentation.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ViewMode {
    #[default]
    Chart,
    Text,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModeController {
    mode: ViewMode,
    chart_kind: ChartKind,
}

impl ViewModeController {
    pub fn new(mode: ViewMode, chart_kind: ChartKind) -> Self {
        Self { mode, chart_kind }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn chart_kind(&self) -> ChartKind {
        self.chart_kind
    }

    pub fn is_chart(&self) -> bool {
        self.mode == ViewMode::Chart
    }

    /// Switches presentation. The selected chart kind is kept as is, so
    /// switching back to `Chart` restores it.
    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        self.chart_kind = kind;
    }

    /// The chart kind to request from the backend, present only in chart mode.
    pub fn chart_request(&self) -> Option<ChartKind> {
        self.is_chart().then_some(self.chart_kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let view = ViewModeController::default();
        assert_eq!(view.mode(), ViewMode::Chart);
        assert_eq!(view.chart_kind(), ChartKind::Pie);
    }

    #[test]
    fn test_text_round_trip_preserves_chart_kind() {
        let mut view = ViewModeController::default();
        view.set_chart_kind(ChartKind::Line);

        view.set_mode(ViewMode::Text);
        assert_eq!(view.chart_kind(), ChartKind::Line);
        assert_eq!(view.chart_request(), None);

        view.set_mode(ViewMode::Chart);
        assert_eq!(view.chart_kind(), ChartKind::Line);
        assert_eq!(view.chart_request(), Some(ChartKind::Line));
    }

    #[test]
    fn test_kind_can_change_while_in_text_mode() {
        let mut view = ViewModeController::new(ViewMode::Text, ChartKind::Pie);
        view.set_chart_kind(ChartKind::Bar);
        view.set_mode(ViewMode::Chart);
        assert_eq!(view.chart_request(), Some(ChartKind::Bar));
    }
}
