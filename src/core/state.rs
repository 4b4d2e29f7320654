//! # Search Session State
//!
//! One `SearchSession` per listing (books, authors). It lives as long as the
//! listing is open and is never persisted.
//!
//! ```text
//! SearchSession
//! ├── kind: EntityKind              // books or authors
//! ├── settings: EngineSettings      // page size, min query length, debounce
//! ├── query: String                 // raw search text
//! ├── sort: SortKey                 // primary / secondary
//! ├── page: u32                     // page of the outstanding or last request
//! ├── accepted_page: u32            // last page merged this generation (0 = none)
//! ├── status: Status                // see pagination.rs for transitions
//! ├── generation: u64               // bumped on every query/sort change
//! ├── has_more: bool                // last page was full
//! ├── last_error: Option<String>    // message of the last failed fetch
//! └── results: Vec<ResultRecord>    // sorted, deduplicated by key
//! ```
//!
//! State changes only happen through `update(session, action)` in action.rs.

use std::time::Duration;

use crate::EntityKind;
use crate::catalog::{PAGE_SIZE, PageRequest, ResultRecord, SortKey};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_SCROLL_THRESHOLD: f32 = 0.5;
pub const DEFAULT_BOOK_MIN_QUERY_LEN: usize = 3;
pub const DEFAULT_AUTHOR_MIN_QUERY_LEN: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading,
    LoadingMore,
    Exhausted,
    Error,
}

impl Status {
    pub fn is_loading(&self) -> bool {
        matches!(self, Status::Loading | Status::LoadingMore)
    }
}

/// Per-kind engine tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub page_size: usize,
    /// Queries shorter than this (in characters) are never fetched.
    pub min_query_len: usize,
    pub debounce: Duration,
    /// Remaining content, in viewports, below which the next page is requested.
    pub scroll_threshold: f32,
}

impl EngineSettings {
    pub fn for_kind(kind: EntityKind) -> Self {
        let min_query_len = match kind {
            EntityKind::Books => DEFAULT_BOOK_MIN_QUERY_LEN,
            EntityKind::Authors => DEFAULT_AUTHOR_MIN_QUERY_LEN,
        };
        Self {
            page_size: PAGE_SIZE,
            min_query_len,
            debounce: DEFAULT_DEBOUNCE,
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchSession {
    pub kind: EntityKind,
    pub settings: EngineSettings,
    pub query: String,
    pub sort: SortKey,
    pub page: u32,
    pub accepted_page: u32,
    pub status: Status,
    pub generation: u64,
    pub has_more: bool,
    pub last_error: Option<String>,
    pub results: Vec<ResultRecord>,
}

impl SearchSession {
    pub fn new(kind: EntityKind, settings: EngineSettings) -> Self {
        Self {
            kind,
            settings,
            query: String::new(),
            sort: SortKey::default(),
            page: 1,
            accepted_page: 0,
            status: Status::Idle,
            generation: 0,
            has_more: true,
            last_error: None,
            results: Vec::new(),
        }
    }

    /// Whether the current query may be sent to the catalog at all.
    /// Blank queries never are, whatever the minimum length.
    pub fn query_is_fetchable(&self) -> bool {
        let trimmed = self.query.trim();
        !trimmed.is_empty() && trimmed.chars().count() >= self.settings.min_query_len
    }

    /// Request for the current page, tagged with the current generation.
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            kind: self.kind,
            query: self.query.clone(),
            page: self.page,
            sort: self.sort,
            generation: self.generation,
        }
    }

    /// Starts a new generation: clears results and rewinds paging.
    pub(crate) fn reset_generation(&mut self) {
        self.generation += 1;
        self.page = 1;
        self.accepted_page = 0;
        self.status = Status::Idle;
        self.has_more = true;
        self.last_error = None;
        self.results.clear();
    }
}
