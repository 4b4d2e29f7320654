//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::EntityKind;
use crate::catalog::{
    CatalogSource, FetchError, PAGE_SIZE, PageRequest, PageResult, ResultRecord, SortKey,
};
use crate::core::state::{EngineSettings, SearchSession, Status};

pub fn record(key: &str, title: &str, secondary: Option<&str>) -> ResultRecord {
    ResultRecord {
        key: key.to_string(),
        display_title: title.to_string(),
        display_subtitle: None,
        image_ref: None,
        sortable_secondary: secondary.map(str::to_string),
    }
}

/// A full page of distinct records keyed `<prefix>-<n>`.
pub fn full_page(generation: u64, page: u32, prefix: &str) -> PageResult {
    PageResult::new(records(prefix, PAGE_SIZE), generation, page)
}

pub fn session(kind: EntityKind) -> SearchSession {
    SearchSession::new(kind, EngineSettings::for_kind(kind))
}

/// A session at generation 1 waiting on page 1 of "tolkien".
pub fn loading_session(kind: EntityKind, sort: SortKey) -> SearchSession {
    let mut session = session(kind);
    session.query = "tolkien".into();
    session.sort = sort;
    session.generation = 1;
    session.status = Status::Loading;
    session
}

/// In-memory catalog that answers from a script and records every request.
#[derive(Default)]
pub struct ScriptedSource {
    pages: Mutex<HashMap<(String, u32), Result<Vec<ResultRecord>, FetchError>>>,
    delays: Mutex<HashMap<u64, Duration>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `(query, page)` with these records.
    pub fn page(self, query: &str, page: u32, records: Vec<ResultRecord>) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert((query.to_string(), page), Ok(records));
        self
    }

    /// Answer `(query, page)` with an error.
    pub fn failing(self, query: &str, page: u32, error: FetchError) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert((query.to_string(), page), Err(error));
        self
    }

    /// Delay every answer to requests of `generation`.
    pub fn delayed(self, generation: u64, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(generation, delay);
        self
    }

    /// Replace the scripted answer for `(query, page)`.
    pub fn set_page(&self, query: &str, page: u32, records: Vec<ResultRecord>) {
        self.pages
            .lock()
            .unwrap()
            .insert((query.to_string(), page), Ok(records));
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// `count` distinct records keyed `<prefix>-<n>`.
pub fn records(prefix: &str, count: usize) -> Vec<ResultRecord> {
    (0..count)
        .map(|n| record(&format!("{prefix}-{n}"), &format!("{prefix} {n:02}"), None))
        .collect()
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        // Answer as scripted at call time, even if the script changes while delayed.
        let answer = self
            .pages
            .lock()
            .unwrap()
            .get(&(request.query.clone(), request.page))
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()));
        let delay = self.delays.lock().unwrap().get(&request.generation).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        answer.map(|records| PageResult::new(records, request.generation, request.page))
    }
}
