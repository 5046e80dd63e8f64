//! History viewer.
//!
//! Append-only list of past query/response pairs, fetched a page at a time.
//! The cursor is the number of entries already held; an empty page marks the
//! end for good.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ChroniclesError;
use crate::query::QueryResult;

pub const HISTORY_FAILURE_FALLBACK: &str = "Failed to retrieve history";

/// One past query and the backend's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub user_query: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub response: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl HistoryEntry {
    pub fn new(user_query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            user_query: user_query.into(),
            response: response.into(),
        }
    }

    /// Chart answers are stored as serialised chart options; this decodes
    /// them. Plain text answers yield `None`.
    pub fn decoded_response(&self) -> Option<QueryResult> {
        let trimmed = self.response.trim_start();
        if !trimmed.starts_with('{') {
            return None;
        }
        serde_json::from_str(trimmed).ok()
    }
}

/// Position of the next page to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryCursor {
    pub offset: usize,
    generation: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryViewer {
    entries: Vec<HistoryEntry>,
    offset: usize,
    end: bool,
    in_flight: bool,
    error: Option<String>,
    // Bumped on reset so pages claimed before it are recognised.
    #[serde(skip)]
    generation: u64,
}

impl HistoryViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_end(&self) -> bool {
        self.end
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether "load more" is currently available.
    pub fn can_load_more(&self) -> bool {
        !self.end && !self.in_flight
    }

    /// Claims the next page. `None` once the end was reached or while another
    /// fetch is outstanding.
    pub fn next_cursor(&mut self) -> Option<HistoryCursor> {
        if !self.can_load_more() {
            return None;
        }
        self.in_flight = true;
        Some(HistoryCursor {
            offset: self.offset,
            generation: self.generation,
        })
    }

    /// Appends a fetched page and advances the cursor by its length.
    /// Returns the number of entries added.
    pub fn apply_page(&mut self, cursor: HistoryCursor, page: Vec<HistoryEntry>) -> usize {
        if !self.is_current(cursor) {
            return 0;
        }

        self.in_flight = false;
        self.error = None;

        let added = page.len();
        if added == 0 {
            self.end = true;
        }
        self.offset += added;
        self.entries.extend(page);
        added
    }

    /// Records a failed fetch; held entries and the cursor stay as they were.
    pub fn fail(&mut self, cursor: HistoryCursor, err: &ChroniclesError) {
        if !self.is_current(cursor) {
            return;
        }
        self.in_flight = false;
        self.error = Some(err.user_message(HISTORY_FAILURE_FALLBACK));
    }

    pub fn reset(&mut self) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
    }

    fn is_current(&self, cursor: HistoryCursor) -> bool {
        cursor.generation == self.generation && cursor.offset == self.offset
    }
}
