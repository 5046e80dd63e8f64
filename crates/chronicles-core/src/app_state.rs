//! Application state.
//!
//! The one state object the client runs on. The use case layer is its only
//! writer; front ends read snapshots of it.

use serde::Serialize;

use crate::api::MessageResponse;
use crate::chart::{ChartAdapter, ChartSpec};
use crate::error::Result;
use crate::history::HistoryViewer;
use crate::query::{QueryData, QueryFlow};
use crate::session::{AuthAction, Session};
use crate::view::{ViewMode, ViewModeController};

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    pub session: Session,
    pub view: ViewModeController,
    pub query: QueryFlow,
    pub history: HistoryViewer,
}

/// What the result area should show.
#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    Chart(ChartSpec),
    Text(String),
    Empty,
}

impl AppState {
    pub fn new(view: ViewModeController) -> Self {
        Self {
            view,
            ..Self::default()
        }
    }

    /// Drops everything tied to the signed-in user; the view choice stays.
    pub fn sign_out(&mut self) {
        self.session.logout();
        self.clear_user_data();
    }

    /// Records a login or signup outcome.
    ///
    /// A successful sign-in starts from a clean slate: the result and history
    /// held for whoever was signed in before are dropped, so history is
    /// fetched again from the first page. A failure changes neither.
    pub fn authenticate(
        &mut self,
        action: AuthAction,
        email: &str,
        outcome: &Result<MessageResponse>,
    ) -> bool {
        if outcome.is_ok() {
            self.clear_user_data();
        }
        self.session.apply(action, email, outcome)
    }

    /// Signs `email` in without a backend call, starting from a clean slate.
    pub fn assume_user(&mut self, email: &str) {
        self.clear_user_data();
        self.session.assume(email);
    }

    fn clear_user_data(&mut self) {
        self.query.reset();
        self.history.reset();
    }

    /// Derives the presentation of the held result under the current view.
    ///
    /// A chart is only produced in chart mode and only from a chart-shaped
    /// result. Text answers are shown as text in either mode, and chart
    /// results are summarised line by line in text mode.
    pub fn presentation(&self) -> Presentation {
        let Some(data) = self.query.result() else {
            return Presentation::Empty;
        };

        match (self.view.mode(), data) {
            (ViewMode::Chart, QueryData::Chart(result)) => {
                ChartAdapter::adapt(Some(result), self.view.chart_kind())
                    .map(Presentation::Chart)
                    .unwrap_or(Presentation::Empty)
            }
            (_, data) => Presentation::Text(data.to_text()),
        }
    }
}
