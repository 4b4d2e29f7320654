//! # Result Accumulator
//!
//! Merges fetched pages into the session's growing list.
//!
//! ```text
//! PageResult ──► generation/page match? ──no──► discard (no mutation)
//!                        │ yes
//!                        ▼
//!                dedupe by key (first seen wins)
//!                        │
//!                        ▼
//!              append, re-sort the whole list
//!                        │
//!                        ▼
//!    full page received? → Idle : Exhausted
//! ```
//!
//! Ordering is a strict total order. Primary sorts by collated title,
//! secondary sorts chronologically with undated records after every dated
//! one. The sort is stable, so ties (and the undated group) keep arrival order.

use std::collections::HashSet;

use chrono::NaiveDate;
use log::debug;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::catalog::{PageResult, ResultRecord, SortKey};
use crate::core::state::{SearchSession, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The page was merged; `added` counts the genuinely new keys.
    Accepted { added: usize },
    /// The page belongs to another generation or page and was dropped.
    Stale,
}

/// Merges one page into the session.
pub fn merge(session: &mut SearchSession, page: PageResult) -> MergeOutcome {
    if page.generation != session.generation
        || page.page != session.page
        || !session.status.is_loading()
    {
        debug!(
            "Discarding page {} of generation {} (session at page {} of generation {}, {:?})",
            page.page, page.generation, session.page, session.generation, session.status
        );
        return MergeOutcome::Stale;
    }

    let incoming = page.received;
    let mut seen: HashSet<String> = session.results.iter().map(|r| r.key.clone()).collect();
    let fresh: Vec<ResultRecord> = page
        .records
        .into_iter()
        .filter(|record| seen.insert(record.key.clone()))
        .collect();
    let added = fresh.len();

    session.results.extend(fresh);
    sort_records(&mut session.results, session.sort);

    session.accepted_page = page.page;
    session.has_more = incoming >= session.settings.page_size;
    session.status = if session.has_more {
        Status::Idle
    } else {
        Status::Exhausted
    };
    session.last_error = None;

    debug!(
        "Merged page {}: {} incoming, {} new, {} total, status {:?}",
        page.page,
        incoming,
        added,
        session.results.len(),
        session.status
    );
    MergeOutcome::Accepted { added }
}

/// Rank of a record under one sort key. Variant order matters: within a
/// secondary sort every `Dated` rank precedes every `Undated` one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortRank {
    Title { collated: String, folded: String },
    Dated(NaiveDate),
    Undated,
}

fn rank(record: &ResultRecord, sort: SortKey) -> SortRank {
    match sort {
        SortKey::Primary => SortRank::Title {
            collated: collation_key(&record.display_title),
            folded: record.display_title.trim().to_lowercase(),
        },
        SortKey::Secondary => record
            .sortable_secondary
            .as_deref()
            .and_then(chronological_key)
            .map_or(SortRank::Undated, SortRank::Dated),
    }
}

/// Sorts records in place. Stable.
pub fn sort_records(records: &mut [ResultRecord], sort: SortKey) {
    records.sort_by_cached_key(|record| rank(record, sort));
}

/// Case- and accent-insensitive key: NFD, combining marks dropped, lowercased.
pub fn collation_key(text: &str) -> String {
    text.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d %B %Y", "%B %d, %Y", "%d %b %Y", "%b %d, %Y"];

/// Interprets free date text such as `1954`, `3 January 1892`, `c. 1850`.
/// Returns `None` when no year can be found.
pub fn chronological_key(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    // "January 1892"
    if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {text}"), "%d %B %Y") {
        return Some(date);
    }

    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() || digits.len() > 4 {
        return None;
    }
    let year: i32 = digits.parse().ok()?;
    NaiveDate::from_ymd_opt(year, 1, 1)
}
