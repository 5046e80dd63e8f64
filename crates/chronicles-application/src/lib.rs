//! Application layer for the Crime Chronicles client.
//!
//! Use cases that coordinate the domain flows with a backend. Front ends
//! render snapshots of the state these use cases own.

pub mod chronicles_usecase;

pub use chronicles_usecase::{ChroniclesUseCase, HistoryLoad, QueryOutcome};
