//! # Actions
//!
//! Everything that can happen to a search session becomes an `Action`.
//! User types? That's `Action::SetQuery(text)`.
//! A page arrives? That's `Action::PageLoaded(page)`.
//!
//! The `update()` function takes the current session and an action,
//! mutates the session and returns the `Effect` the runtime must carry out.
//! No I/O here. Timers and network calls happen in the browser runtime.
//!
//! ```text
//! Session + Action  →  update()  →  Session' + Effect
//! ```

use log::debug;

use crate::catalog::{FetchError, PageRequest, PageResult, SortKey};
use crate::core::accumulator::{self, MergeOutcome};
use crate::core::pagination::{self, Viewport};
use crate::core::query::{self, QueryChange};
use crate::core::state::SearchSession;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetQuery(String),
    SetSort(SortKey),
    /// The quiescence window for `generation` expired.
    DebounceElapsed { generation: u64 },
    Scrolled(Viewport),
    Retry,
    PageLoaded(PageResult),
    PageFailed {
        generation: u64,
        page: u32,
        error: FetchError,
    },
    /// The user picked the record at this index of `results`.
    Select(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Cancel any pending debounce and schedule one for this generation.
    Debounce(u64),
    CancelDebounce,
    Fetch(PageRequest),
    /// Key of the selected record, for the navigation layer.
    Selected(String),
}

pub fn update(session: &mut SearchSession, action: Action) -> Effect {
    match action {
        Action::SetQuery(text) => query_effect(query::set_query(session, &text)),
        Action::SetSort(sort) => query_effect(query::set_sort(session, sort)),
        Action::DebounceElapsed { generation } => {
            if generation != session.generation || session.status.is_loading() {
                debug!(
                    "Ignoring debounce for generation {} (current {})",
                    generation, session.generation
                );
                return Effect::None;
            }
            pagination::begin_initial(session).map_or(Effect::None, Effect::Fetch)
        }
        Action::Scrolled(viewport) => {
            pagination::on_scroll(session, viewport).map_or(Effect::None, Effect::Fetch)
        }
        Action::Retry => pagination::retry(session).map_or(Effect::None, Effect::Fetch),
        Action::PageLoaded(page) => {
            if let MergeOutcome::Accepted { added } = accumulator::merge(session, page) {
                debug!("Accepted {} new records", added);
            }
            Effect::None
        }
        Action::PageFailed {
            generation,
            page,
            error,
        } => {
            pagination::fail(session, generation, page, &error);
            Effect::None
        }
        Action::Select(index) => session
            .results
            .get(index)
            .map_or(Effect::None, |record| Effect::Selected(record.key.clone())),
    }
}

fn query_effect(change: QueryChange) -> Effect {
    match change {
        QueryChange::Unchanged => Effect::None,
        QueryChange::Schedule(generation) => Effect::Debounce(generation),
        QueryChange::Blocked => Effect::CancelDebounce,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityKind;
    use crate::core::state::Status;
    use crate::test_support::{full_page, record, session};

    fn fetch_request(effect: Effect) -> PageRequest {
        match effect {
            Effect::Fetch(request) => request,
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    #[test]
    fn test_query_then_debounce_fetches_page_one() {
        let mut s = session(EntityKind::Books);
        assert_eq!(
            update(&mut s, Action::SetQuery("tolkien".into())),
            Effect::Debounce(1)
        );
        let request = fetch_request(update(&mut s, Action::DebounceElapsed { generation: 1 }));
        assert_eq!(request.query, "tolkien");
        assert_eq!(request.page, 1);
        assert_eq!(request.generation, 1);
        assert_eq!(s.status, Status::Loading);
    }

    #[test]
    fn test_short_query_cancels_and_never_fetches() {
        let mut s = session(EntityKind::Books);
        update(&mut s, Action::SetQuery("tolkien".into()));
        assert_eq!(
            update(&mut s, Action::SetQuery("xq".into())),
            Effect::CancelDebounce
        );
        assert_eq!(
            update(&mut s, Action::DebounceElapsed { generation: 1 }),
            Effect::None
        );
        assert_eq!(
            update(&mut s, Action::DebounceElapsed { generation: 2 }),
            Effect::None
        );
        assert!(s.results.is_empty());
        assert_eq!(s.status, Status::Idle);
    }

    #[test]
    fn test_sort_change_discards_in_flight_page() {
        // "tolkien" page 1 is in flight when the sort flips to date.
        let mut s = session(EntityKind::Books);
        update(&mut s, Action::SetQuery("tolkien".into()));
        let stale = fetch_request(update(&mut s, Action::DebounceElapsed { generation: 1 }));

        assert_eq!(
            update(&mut s, Action::SetSort(SortKey::Secondary)),
            Effect::Debounce(2)
        );
        let fresh = fetch_request(update(&mut s, Action::DebounceElapsed { generation: 2 }));
        assert_eq!(fresh.sort, SortKey::Secondary);

        // The stale page lands first and must be ignored.
        update(&mut s, Action::PageLoaded(full_page(stale.generation, 1, "old")));
        assert!(s.results.is_empty());
        assert_eq!(s.status, Status::Loading);

        let page = PageResult::new(
            vec![
                record("b", "B", Some("1977")),
                record("n", "N", None),
                record("a", "A", Some("1937")),
            ],
            fresh.generation,
            1,
        );
        update(&mut s, Action::PageLoaded(page));
        let keys: Vec<_> = s.results.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "n"]);
        assert_eq!(s.status, Status::Exhausted);
    }

    #[test]
    fn test_second_page_failure_keeps_first_page() {
        let mut s = session(EntityKind::Books);
        update(&mut s, Action::SetQuery("tolkien".into()));
        update(&mut s, Action::DebounceElapsed { generation: 1 });
        update(&mut s, Action::PageLoaded(full_page(1, 1, "p1")));
        assert_eq!(s.status, Status::Idle);

        let request = fetch_request(update(&mut s, Action::Scrolled(Viewport::at_end(20, 10))));
        assert_eq!(request.page, 2);

        update(
            &mut s,
            Action::PageFailed {
                generation: 1,
                page: 2,
                error: FetchError::Api {
                    status: 500,
                    message: "boom".into(),
                },
            },
        );
        assert_eq!(s.status, Status::Error);
        assert_eq!(s.results.len(), 20);
        assert_eq!(s.page, 2);

        let retry = fetch_request(update(&mut s, Action::Retry));
        assert_eq!(retry.page, 2);
        update(&mut s, Action::PageLoaded(full_page(1, 2, "p2")));
        assert_eq!(s.results.len(), 40);
        assert_eq!(s.status, Status::Idle);
    }

    #[test]
    fn test_exhausted_ignores_scroll_until_new_generation() {
        let mut s = session(EntityKind::Authors);
        update(&mut s, Action::SetQuery("le guin".into()));
        update(&mut s, Action::DebounceElapsed { generation: 1 });
        let page = PageResult::new(
            vec![record("OL1A", "Ursula K. Le Guin", Some("21 October 1929"))],
            1,
            1,
        );
        update(&mut s, Action::PageLoaded(page));
        assert_eq!(s.status, Status::Exhausted);

        for _ in 0..3 {
            assert_eq!(
                update(&mut s, Action::Scrolled(Viewport::at_end(1, 10))),
                Effect::None
            );
        }

        assert_eq!(
            update(&mut s, Action::SetQuery("le guin u".into())),
            Effect::Debounce(2)
        );
        assert_eq!(s.status, Status::Idle);
    }

    #[test]
    fn test_select_emits_key() {
        let mut s = session(EntityKind::Books);
        s.results.push(record("/works/OL1W", "One", None));
        assert_eq!(
            update(&mut s, Action::Select(0)),
            Effect::Selected("/works/OL1W".into())
        );
        assert_eq!(update(&mut s, Action::Select(5)), Effect::None);
    }
}
