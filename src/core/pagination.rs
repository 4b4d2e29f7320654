//! # Pagination Driver
//!
//! Decides when the next page is requested and owns the status machine:
//!
//! ```text
//!            ┌──────────► Loading ─────┬──► Idle
//!            │   (page 1, retry)       ├──► Exhausted   (short page)
//!   Idle ────┤                         └──► Error
//!            │
//!            └──────────► LoadingMore ─┬──► Idle
//!                (scroll near end)     ├──► Exhausted
//!                                      └──► Error
//!
//!   Error ──(manual retry)──► Loading
//!   any ──(new generation)──► Idle
//! ```
//!
//! Exhausted is terminal until the query or sort changes. A failed page is
//! not rolled back, so a retry asks for the same page number again.

use log::{debug, warn};

use crate::catalog::{FetchError, PageRequest};
use crate::core::state::{SearchSession, Status};

/// The visible window of the rendered list, in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub first_visible: usize,
    pub visible_rows: usize,
}

impl Viewport {
    /// A viewport scrolled to the bottom of a list of `content_rows`.
    pub fn at_end(content_rows: usize, visible_rows: usize) -> Self {
        Self {
            first_visible: content_rows.saturating_sub(visible_rows),
            visible_rows,
        }
    }

    /// True when the content left below the viewport is within
    /// `threshold` viewports.
    pub fn near_end(&self, content_rows: usize, threshold: f32) -> bool {
        let seen = self.first_visible + self.visible_rows;
        let remaining = content_rows.saturating_sub(seen);
        remaining as f32 <= threshold * self.visible_rows as f32
    }
}

/// Enters `Loading` for page 1 of the current generation.
/// Returns `None` when the query may not be fetched.
pub fn begin_initial(session: &mut SearchSession) -> Option<PageRequest> {
    if !session.query_is_fetchable() {
        return None;
    }
    session.page = 1;
    session.status = Status::Loading;
    debug!("Generation {}: loading page 1", session.generation);
    Some(session.page_request())
}

/// Whether a scroll trigger may start the next page right now.
pub fn can_load_more(session: &SearchSession) -> bool {
    session.status == Status::Idle
        && session.has_more
        && session.accepted_page > 0
        && session.accepted_page == session.page
        && session.query_is_fetchable()
}

/// Handles a scroll event. Starts `LoadingMore` for the next page when the
/// viewport is near the end and the session is ready for it.
pub fn on_scroll(session: &mut SearchSession, viewport: Viewport) -> Option<PageRequest> {
    if !viewport.near_end(session.results.len(), session.settings.scroll_threshold) {
        return None;
    }
    if !can_load_more(session) {
        return None;
    }
    session.page += 1;
    session.status = Status::LoadingMore;
    debug!(
        "Generation {}: loading more, page {}",
        session.generation, session.page
    );
    Some(session.page_request())
}

/// Manual retry from `Error`. Re-requests the page that failed.
pub fn retry(session: &mut SearchSession) -> Option<PageRequest> {
    if session.status != Status::Error || !session.query_is_fetchable() {
        return None;
    }
    session.status = Status::Loading;
    debug!(
        "Generation {}: retrying page {}",
        session.generation, session.page
    );
    Some(session.page_request())
}

/// Records a failed fetch. Stale failures are ignored and return `false`.
/// Results and page are left as they were.
pub fn fail(session: &mut SearchSession, generation: u64, page: u32, error: &FetchError) -> bool {
    if generation != session.generation || page != session.page || !session.status.is_loading() {
        debug!(
            "Ignoring failure for page {} of generation {}: {}",
            page, generation, error
        );
        return false;
    }

    if *error == FetchError::EmptyQuery {
        session.status = Status::Idle;
        return true;
    }

    warn!(
        "Page {} of generation {} failed: {}",
        page, generation, error
    );
    session.status = Status::Error;
    session.last_error = Some(error.to_string());
    true
}
