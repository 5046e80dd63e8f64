//! Query domain module.
//!
//! - `model`: query results as returned by the backend
//! - `flow`: the submission state machine

mod flow;
mod model;

pub use flow::{
    Commit, QUERY_FAILURE_FALLBACK, QUERY_SUCCESS_FALLBACK, QueryFlow, QueryPhase, QueryTicket,
};
pub use model::{DataPoint, QueryData, QueryResult, format_value};
