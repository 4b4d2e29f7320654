//! # Query Controller
//!
//! Owns query text and sort changes. Every real change starts a new
//! generation (results cleared, paging rewound) so nothing sorted or
//! filtered for the old input stays visible. The fetch itself waits for a
//! quiescence window: each change cancels the pending fire and schedules a
//! fresh one, and only the one that survives to expiry runs.

use std::time::Duration;

use log::debug;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;

use crate::catalog::SortKey;
use crate::core::action::Action;
use crate::core::state::SearchSession;

/// What a query or sort change asks of the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryChange {
    /// Nothing changed.
    Unchanged,
    /// New generation with a fetchable query: schedule the debounced fetch.
    Schedule(u64),
    /// New generation whose query is below the minimum: nothing to fetch.
    Blocked,
}

pub fn set_query(session: &mut SearchSession, text: &str) -> QueryChange {
    if session.query == text {
        return QueryChange::Unchanged;
    }
    session.query = text.to_string();
    start_generation(session)
}

pub fn set_sort(session: &mut SearchSession, sort: SortKey) -> QueryChange {
    if session.sort == sort {
        return QueryChange::Unchanged;
    }
    session.sort = sort;
    start_generation(session)
}

fn start_generation(session: &mut SearchSession) -> QueryChange {
    session.reset_generation();
    debug!(
        "Generation {}: query={:?}, sort={:?}",
        session.generation, session.query, session.sort
    );
    if session.query_is_fetchable() {
        QueryChange::Schedule(session.generation)
    } else {
        QueryChange::Blocked
    }
}

/// A cancellable, delayed `DebounceElapsed` message.
pub struct Debouncer {
    delay: Duration,
    pending: Option<(u64, AbortHandle)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Cancels any pending fire and schedules one for `generation`.
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, generation: u64, sender: UnboundedSender<Action>) {
        self.cancel();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sender.send(Action::DebounceElapsed { generation });
        })
        .abort_handle();
        self.pending = Some((generation, handle));
    }

    pub fn cancel(&mut self) {
        if let Some((generation, handle)) = self.pending.take() {
            debug!("Cancelling debounced fetch for generation {}", generation);
            handle.abort();
        }
    }

    /// Marks the fire for `generation` as delivered.
    pub fn fired(&mut self, generation: u64) {
        if matches!(self.pending, Some((pending, _)) if pending == generation) {
            self.pending = None;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
