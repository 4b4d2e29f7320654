//! Detail views reached after a record is selected.

use serde::Deserialize;

/// Placeholder shown when an author cannot be resolved.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Free text that the catalog serves either bare or wrapped as `{ "value": ... }`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum TextValue {
    Plain(String),
    Typed { value: String },
}

impl TextValue {
    pub fn into_text(self) -> String {
        match self {
            TextValue::Plain(text) | TextValue::Typed { value: text } => text,
        }
    }
}

/// An author credited on a book. `key` is `None` for a placeholder, which is not selectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRef {
    pub key: Option<String>,
    pub name: String,
}

impl AuthorRef {
    pub fn placeholder() -> Self {
        Self {
            key: None,
            name: UNKNOWN_AUTHOR.to_string(),
        }
    }

    pub fn is_selectable(&self) -> bool {
        self.key.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetails {
    pub key: String,
    pub title: String,
    pub description: Option<String>,
    pub subjects: Vec<String>,
    pub first_publish_date: Option<String>,
    pub cover_ids: Vec<i64>,
    pub authors: Vec<AuthorRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorLink {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorDetails {
    pub key: String,
    pub name: String,
    pub fuller_name: Option<String>,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub bio: Option<String>,
    pub photo_ids: Vec<i64>,
    pub links: Vec<AuthorLink>,
}

/// Strips the `/authors/` prefix so author keys compare equal however they were spelled.
pub fn bare_author_key(key: &str) -> &str {
    key.trim_start_matches("/authors/")
}
