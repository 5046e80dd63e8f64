//! Backend API contract.
//!
//! Request/response bodies exchanged with the Crime Chronicles backend and the
//! `CrimeBackend` trait that hides the transport. The HTTP implementation
//! lives in `chronicles-infrastructure`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chart::ChartKind;
use crate::error::Result;
use crate::history::HistoryEntry;
use crate::query::QueryData;
use crate::session::{LoginForm, SignupForm};

/// Body of `POST /query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub user_query: String,
    pub user_email: String,
    pub is_chart: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartKind>,
}

/// Success body of `/login` and `/signup`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Success body of `POST /query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<QueryData>,
}

/// Error body the backend sends with non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<String>,
}

/// Transport-independent access to the backend.
///
/// Non-success answers surface as `ChroniclesError::Backend` carrying the
/// server's `detail` text, or an empty detail when the server sent none.
#[async_trait]
pub trait CrimeBackend: Send + Sync {
    async fn login(&self, form: &LoginForm) -> Result<MessageResponse>;

    async fn signup(&self, form: &SignupForm) -> Result<MessageResponse>;

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse>;

    /// Fetches the page of past queries starting at `offset` (the backend's `page_no`).
    async fn history(&self, user_email: &str, offset: usize) -> Result<Vec<HistoryEntry>>;
}
