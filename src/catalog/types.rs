use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::EntityKind;

/// Fixed number of records requested per page.
pub const PAGE_SIZE: usize = 20;

/// Sort preference for a listing.
///
/// `Primary` orders by the record's display title (book title, author name).
/// `Secondary` orders chronologically (first publish year, birth date).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    #[value(alias = "title", alias = "name")]
    Primary,
    #[value(alias = "year", alias = "birth-date")]
    Secondary,
}

impl SortKey {
    /// Human-facing label for this sort under the given entity kind.
    pub fn label(&self, kind: EntityKind) -> &'static str {
        match (kind, self) {
            (EntityKind::Books, SortKey::Primary) => "title",
            (EntityKind::Books, SortKey::Secondary) => "publish year",
            (EntityKind::Authors, SortKey::Primary) => "name",
            (EntityKind::Authors, SortKey::Secondary) => "birth date",
        }
    }
}

/// Normalized projection of one remote entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    /// Stable identifier from the catalog. Unique within a session.
    pub key: String,
    pub display_title: String,
    pub display_subtitle: Option<String>,
    /// Identifier handed to the image resolver. `None` renders a placeholder.
    pub image_ref: Option<String>,
    /// Date or year text used by [`SortKey::Secondary`]. May be absent.
    pub sortable_secondary: Option<String>,
}

/// One remote page request, tagged with the generation that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub kind: EntityKind,
    pub query: String,
    /// 1-based page index.
    pub page: u32,
    pub sort: SortKey,
    pub generation: u64,
}

impl PageRequest {
    /// Zero-based record offset for this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * PAGE_SIZE
    }

    pub fn limit(&self) -> usize {
        PAGE_SIZE
    }
}

/// A successfully parsed page, still carrying its request tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub records: Vec<ResultRecord>,
    /// Entries the catalog returned, counting ones dropped while parsing.
    /// Only this count decides whether more pages may exist.
    pub received: usize,
    pub generation: u64,
    pub page: u32,
}

impl PageResult {
    /// A page where every returned entry became a record.
    pub fn new(records: Vec<ResultRecord>, generation: u64, page: u32) -> Self {
        Self {
            received: records.len(),
            records,
            generation,
            page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(page: u32) -> PageRequest {
        PageRequest {
            kind: EntityKind::Books,
            query: "tolkien".into(),
            page,
            sort: SortKey::Primary,
            generation: 1,
        }
    }

    #[test]
    fn test_offset_is_zero_based_from_page() {
        assert_eq!(request(1).offset(), 0);
        assert_eq!(request(2).offset(), 20);
        assert_eq!(request(5).offset(), 80);
        assert_eq!(request(1).limit(), PAGE_SIZE);
    }

    #[test]
    fn test_sort_labels_follow_kind() {
        assert_eq!(SortKey::Primary.label(EntityKind::Books), "title");
        assert_eq!(SortKey::Secondary.label(EntityKind::Authors), "birth date");
    }

    #[test]
    fn test_sort_key_parses_aliases() {
        assert_eq!(SortKey::from_str("year", true), Ok(SortKey::Secondary));
        assert_eq!(SortKey::from_str("name", true), Ok(SortKey::Primary));
        assert_eq!(SortKey::from_str("secondary", true), Ok(SortKey::Secondary));
    }
}
