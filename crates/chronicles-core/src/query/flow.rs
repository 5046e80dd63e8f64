//! Query submission flow.
//!
//! `Idle -> Submitting -> (success | error) -> Idle`. Every accepted
//! submission gets a sequence number; a response is committed only if it
//! belongs to the most recent submission, so a slow answer to an older query
//! can never overwrite a newer one.

use serde::Serialize;

use super::QueryData;
use crate::api::{QueryRequest, QueryResponse};
use crate::error::{ChroniclesError, EMPTY_QUERY_MESSAGE, Result};
use crate::view::ViewModeController;

pub const QUERY_SUCCESS_FALLBACK: &str = "Query processed successfully.";
pub const QUERY_FAILURE_FALLBACK: &str = "Failed to process query";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum QueryPhase {
    #[default]
    Idle,
    Submitting { seq: u64 },
}

/// An accepted submission: the request to send and the sequence number to
/// complete it with.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTicket {
    pub seq: u64,
    pub request: QueryRequest,
}

/// What `QueryFlow::complete` did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// The response belonged to the latest submission and is now the state.
    Applied,
    /// A newer submission superseded this one; the response was dropped.
    Stale,
    /// The flow was reset (sign-out or a new sign-in) while this submission
    /// was pending and nothing newer was sent; the response was dropped.
    Discarded,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryFlow {
    phase: QueryPhase,
    last_seq: u64,
    result: Option<QueryData>,
    last_query: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl QueryFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> QueryPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, QueryPhase::Submitting { .. })
    }

    pub fn result(&self) -> Option<&QueryData> {
        self.result.as_ref()
    }

    /// Text of the query whose result is currently held.
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Starts a submission.
    ///
    /// Blank text fails with `EmptyQuery`, records the inline error and leaves
    /// the phase untouched. Otherwise the previous message and error are
    /// cleared and a ticket carrying the request body is returned. A
    /// submission made while another is pending replaces it.
    pub fn begin(
        &mut self,
        text: &str,
        user_email: &str,
        view: &ViewModeController,
    ) -> Result<QueryTicket> {
        let query = text.trim();
        if query.is_empty() {
            self.error = Some(EMPTY_QUERY_MESSAGE.to_string());
            return Err(ChroniclesError::EmptyQuery);
        }

        self.error = None;
        self.message = None;
        self.last_seq += 1;
        let seq = self.last_seq;
        self.phase = QueryPhase::Submitting { seq };

        Ok(QueryTicket {
            seq,
            request: QueryRequest {
                user_query: query.to_string(),
                user_email: user_email.to_string(),
                is_chart: view.is_chart(),
                chart_type: view.chart_request(),
            },
        })
    }

    /// Applies the outcome of the submission numbered `seq`.
    ///
    /// Success stores the returned data and message and clears the error.
    /// Failure stores the error message and keeps the previous result.
    pub fn complete(
        &mut self,
        seq: u64,
        query: &str,
        outcome: Result<QueryResponse>,
    ) -> Commit {
        if self.phase != (QueryPhase::Submitting { seq }) {
            return if self.last_seq > seq {
                Commit::Stale
            } else {
                Commit::Discarded
            };
        }

        match outcome {
            Ok(response) => {
                self.result = response.data;
                self.last_query = Some(query.to_string());
                self.message = Some(
                    response
                        .message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| QUERY_SUCCESS_FALLBACK.to_string()),
                );
                self.error = None;
            }
            Err(err) => {
                self.message = None;
                self.error = Some(err.user_message(QUERY_FAILURE_FALLBACK));
            }
        }

        self.phase = QueryPhase::Idle;
        Commit::Applied
    }

    /// Drops everything held for the current user.
    pub fn reset(&mut self) {
        *self = Self {
            last_seq: self.last_seq,
            ..Self::default()
        };
    }
}
