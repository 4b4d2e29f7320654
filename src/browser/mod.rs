//! # Browser Runtime
//!
//! Drives one `SearchSession` on tokio. The reducer decides, this module
//! does the I/O: it owns the debounce timer and spawns catalog fetches.
//!
//! All results come back through one channel and are applied by the single
//! owner of the session, so there is never more than one mutation at a time.
//! Fetches are never aborted. When the query changes underneath them they
//! complete normally and the accumulator drops their pages.
//!
//! ```text
//!   dispatch(Action) ──► update() ──► Effect
//!                                       │
//!        ┌──────────────┬───────────────┼─────────────────┐
//!        ▼              ▼               ▼                 ▼
//!   Debounce(gen)  CancelDebounce  Fetch(request)   Selected(key)
//!        │                              │                 │
//!   sleep, then                    spawn source      returned to
//!   DebounceElapsed ──┐            .fetch_page()     the caller
//!                     ▼                 │
//!                  channel ◄── PageLoaded / PageFailed
//! ```

pub mod input;
pub mod render;

use std::sync::Arc;

use log::debug;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::EntityKind;
use crate::catalog::{CatalogSource, PageRequest, SortKey};
use crate::core::pagination::Viewport;
use crate::core::query::Debouncer;
use crate::core::state::{EngineSettings, SearchSession};
use crate::core::{Action, Effect, update};

/// Rows assumed visible when the caller has no real viewport.
pub const DEFAULT_VISIBLE_ROWS: usize = 10;

pub struct Browser {
    session: SearchSession,
    source: Arc<dyn CatalogSource>,
    debouncer: Debouncer,
    tx: UnboundedSender<Action>,
    rx: UnboundedReceiver<Action>,
}

impl Browser {
    pub fn new(
        kind: EntityKind,
        settings: EngineSettings,
        sort: SortKey,
        source: Arc<dyn CatalogSource>,
    ) -> Self {
        let debouncer = Debouncer::new(settings.debounce);
        let mut session = SearchSession::new(kind, settings);
        session.sort = sort;
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session,
            source,
            debouncer,
            tx,
            rx,
        }
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Applies one action and carries out its effect.
    /// Returns the selected key when the action was a selection.
    pub fn dispatch(&mut self, action: Action) -> Option<String> {
        if let Action::DebounceElapsed { generation } = action {
            self.debouncer.fired(generation);
        }

        match update(&mut self.session, action) {
            Effect::None => None,
            Effect::Debounce(generation) => {
                self.debouncer.schedule(generation, self.tx.clone());
                None
            }
            Effect::CancelDebounce => {
                self.debouncer.cancel();
                None
            }
            Effect::Fetch(request) => {
                self.spawn_fetch(request);
                None
            }
            Effect::Selected(key) => Some(key),
        }
    }

    fn spawn_fetch(&self, request: PageRequest) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        debug!(
            "Spawning {} fetch: page {} of generation {}",
            source.name(),
            request.page,
            request.generation
        );
        tokio::spawn(async move {
            let action = match source.fetch_page(&request).await {
                Ok(page) => Action::PageLoaded(page),
                Err(error) => Action::PageFailed {
                    generation: request.generation,
                    page: request.page,
                    error,
                },
            };
            let _ = tx.send(action);
        });
    }

    /// Scroll trigger with the viewport resting at the end of the list.
    pub fn scroll_to_end(&mut self) {
        let viewport = Viewport::at_end(self.session.results.len(), DEFAULT_VISIBLE_ROWS);
        self.dispatch(Action::Scrolled(viewport));
    }

    /// Waits for the next background action (debounce fire or fetch outcome).
    pub async fn next_action(&mut self) -> Option<Action> {
        self.rx.recv().await
    }

    /// Whether a debounced fetch is pending or a fetch for the current
    /// generation is outstanding.
    pub fn is_busy(&self) -> bool {
        self.debouncer.is_pending() || self.session.status.is_loading()
    }

    /// Processes background actions until the session is no longer busy.
    pub async fn settle(&mut self) {
        while self.is_busy() {
            match self.rx.recv().await {
                Some(action) => {
                    self.dispatch(action);
                }
                None => break,
            }
        }
    }

    /// Applies every background action that has already arrived, without waiting.
    pub fn drain(&mut self) {
        while let Ok(action) = self.rx.try_recv() {
            self.dispatch(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FetchError;
    use crate::core::state::Status;
    use crate::test_support::{ScriptedSource, record, records};
    use std::time::Duration;

    fn browser(kind: EntityKind, source: Arc<ScriptedSource>) -> Browser {
        Browser::new(kind, EngineSettings::for_kind(kind), SortKey::Primary, source)
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_within_window_fetch_once() {
        let source = Arc::new(ScriptedSource::new().page("tolkien", 1, records("t", 3)));
        let mut browser = browser(EntityKind::Books, Arc::clone(&source));

        for text in ["t", "to", "tol", "tolk", "tolki", "tolkie", "tolkien"] {
            browser.dispatch(Action::SetQuery(text.to_string()));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        browser.settle().await;

        let requests = source.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query, "tolkien");
        assert_eq!(requests[0].page, 1);
        assert_eq!(browser.session().results.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_book_query_issues_no_request() {
        let source = Arc::new(ScriptedSource::new());
        let mut browser = browser(EntityKind::Books, Arc::clone(&source));

        browser.dispatch(Action::SetQuery("xq".into()));
        assert!(!browser.is_busy());
        tokio::time::sleep(Duration::from_secs(1)).await;
        browser.drain();

        assert!(source.requests().is_empty());
        assert!(browser.session().results.is_empty());
        assert_eq!(browser.session().status, Status::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stale_page_is_discarded_after_sort_change() {
        let by_title = vec![
            record("hobbit", "The Hobbit", Some("1937")),
            record("silm", "The Silmarillion", Some("1977")),
            record("lotr", "The Lord of the Rings", Some("1954")),
        ];
        let source = Arc::new(
            ScriptedSource::new()
                .page("tolkien", 1, by_title)
                .delayed(1, Duration::from_secs(3)),
        );
        let mut browser = browser(EntityKind::Books, Arc::clone(&source));

        browser.dispatch(Action::SetQuery("tolkien".into()));
        let fire = browser.next_action().await.unwrap();
        browser.dispatch(fire);
        tokio::task::yield_now().await;
        assert_eq!(browser.session().status, Status::Loading);

        // Sort flips while generation 1 is still on the wire.
        source.set_page(
            "tolkien",
            1,
            vec![
                record("lotr", "The Lord of the Rings", Some("1954")),
                record("hobbit", "The Hobbit", Some("1937")),
                record("tales", "Unfinished Tales", None),
            ],
        );
        browser.dispatch(Action::SetSort(SortKey::Secondary));
        browser.settle().await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        browser.drain();

        let session = browser.session();
        assert_eq!(session.generation, 2);
        let keys: Vec<_> = session.results.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["hobbit", "lotr", "tales"]);
        assert_eq!(session.status, Status::Exhausted);

        let requests = source.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].sort, SortKey::Secondary);
        assert_eq!(requests[1].generation, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_second_page_retries_same_page() {
        let source = Arc::new(
            ScriptedSource::new()
                .page("dune", 1, records("a", 20))
                .failing("dune", 2, FetchError::Transport("timed out".into())),
        );
        let mut browser = browser(EntityKind::Books, Arc::clone(&source));

        browser.dispatch(Action::SetQuery("dune".into()));
        browser.settle().await;
        assert_eq!(browser.session().status, Status::Idle);

        browser.scroll_to_end();
        browser.settle().await;
        assert_eq!(browser.session().status, Status::Error);
        assert_eq!(browser.session().results.len(), 20);
        assert_eq!(browser.session().page, 2);

        source.set_page("dune", 2, records("b", 5));
        browser.dispatch(Action::Retry);
        browser.settle().await;

        assert_eq!(browser.session().results.len(), 25);
        assert_eq!(browser.session().status, Status::Exhausted);
        let pages: Vec<_> = source.requests().iter().map(|r| r.page).collect();
        assert_eq!(pages, vec![1, 2, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_listing_stops_fetching() {
        let source = Arc::new(ScriptedSource::new().page("herbert", 1, records("h", 4)));
        let mut browser = browser(EntityKind::Authors, Arc::clone(&source));

        browser.dispatch(Action::SetQuery("herbert".into()));
        browser.settle().await;
        for _ in 0..3 {
            browser.scroll_to_end();
            browser.settle().await;
        }

        assert_eq!(browser.session().status, Status::Exhausted);
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_returns_key() {
        let source = Arc::new(ScriptedSource::new().page("le guin", 1, records("OL", 2)));
        let mut browser = browser(EntityKind::Authors, source);
        browser.dispatch(Action::SetQuery("le guin".into()));
        browser.settle().await;
        assert_eq!(browser.dispatch(Action::Select(1)), Some("OL-1".to_string()));
    }
}
