//! Open Library catalog source.
//!
//! Uses the public JSON endpoints:
//! - `/search.json` for books (works), `/search/authors.json` for authors
//! - `/works/<id>.json` and `/authors/<id>.json` for details
//!
//! Search results are paged with `offset`/`limit`. A page shorter than the
//! limit means the listing is exhausted.

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, info, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::EntityKind;
use crate::catalog::details::{
    AuthorDetails, AuthorLink, AuthorRef, BookDetails, TextValue, UNKNOWN_AUTHOR, bare_author_key,
};
use crate::catalog::{CatalogSource, FetchError, PageRequest, PageResult, ResultRecord, SortKey};

pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";

const UNTITLED: &str = "Untitled";

// ============================================================================
// Open Library API Types
// ============================================================================

/// Search envelope shared by both search endpoints.
#[derive(Deserialize, Debug)]
struct SearchResponse<D> {
    docs: Vec<D>,
}

#[derive(Deserialize, Debug)]
struct BookDoc {
    key: Option<String>,
    title: Option<String>,
    author_name: Option<Vec<String>>,
    author_key: Option<Vec<String>>,
    cover_i: Option<i64>,
    first_publish_year: Option<i32>,
}

#[derive(Deserialize, Debug)]
struct AuthorDoc {
    key: Option<String>,
    name: Option<String>,
    birth_date: Option<String>,
    work_count: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct WorkAuthorKey {
    key: String,
}

#[derive(Deserialize, Debug)]
struct WorkAuthor {
    author: WorkAuthorKey,
}

#[derive(Deserialize, Debug)]
struct WorkResponse {
    title: Option<String>,
    description: Option<TextValue>,
    #[serde(default)]
    subjects: Vec<String>,
    first_publish_date: Option<String>,
    #[serde(default)]
    covers: Vec<i64>,
    #[serde(default)]
    authors: Vec<WorkAuthor>,
}

#[derive(Deserialize, Debug)]
struct LinkResponse {
    title: Option<String>,
    url: String,
}

#[derive(Deserialize, Debug)]
struct AuthorResponse {
    name: Option<String>,
    fuller_name: Option<String>,
    birth_date: Option<String>,
    death_date: Option<String>,
    bio: Option<TextValue>,
    #[serde(default)]
    photos: Vec<i64>,
    #[serde(default)]
    links: Vec<LinkResponse>,
}

// ============================================================================
// Translation Layer
// ============================================================================

/// Maps the sort preference to the `sort` parameter of the books endpoint.
fn book_sort_param(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Primary => "title",
        SortKey::Secondary => "first_publish_year",
    }
}

/// Converts a book doc into a record. Docs without a key are dropped.
fn book_record(doc: BookDoc, author: String) -> Option<ResultRecord> {
    let key = doc.key.filter(|k| !k.is_empty())?;
    Some(ResultRecord {
        key,
        display_title: doc.title.unwrap_or_else(|| UNTITLED.to_string()),
        display_subtitle: Some(author),
        image_ref: doc.cover_i.map(|id| id.to_string()),
        sortable_secondary: doc.first_publish_year.map(|year| year.to_string()),
    })
}

fn author_record(doc: AuthorDoc) -> Option<ResultRecord> {
    let key = doc.key.filter(|k| !k.is_empty())?;
    Some(ResultRecord {
        image_ref: Some(key.clone()),
        key,
        display_title: doc.name.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        display_subtitle: Some(format!("{} works", doc.work_count.unwrap_or(0))),
        sortable_secondary: doc.birth_date.filter(|d| !d.trim().is_empty()),
    })
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))
}

// ============================================================================
// Source Implementation
// ============================================================================

/// Open Library API client.
pub struct OpenLibrary {
    base_url: String,
    client: reqwest::Client,
}

impl OpenLibrary {
    pub fn new(base_url: Option<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Builds the source around a preconfigured client (timeouts live on the client).
    pub fn with_client(base_url: Option<String>, client: reqwest::Client) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues a GET and decodes the JSON body. Non-2xx answers become `FetchError::Api`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        debug!("Open Library response status: {} for {}", status, url);

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Open Library error: {} - {}", status.as_u16(), message);
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        parse_json(&body).inspect_err(|e| warn!("Malformed body from {}: {}", url, e))
    }

    fn search_params(request: &PageRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", request.query.trim().to_string()),
            ("offset", request.offset().to_string()),
            ("limit", request.limit().to_string()),
        ];
        if request.kind == EntityKind::Books {
            params.push(("sort", book_sort_param(request.sort).to_string()));
        }
        params
    }

    /// Returns the parsed records and the number of docs the catalog sent.
    async fn search_books(
        &self,
        request: &PageRequest,
    ) -> Result<(Vec<ResultRecord>, usize), FetchError> {
        let url = format!("{}/search.json", self.base_url);
        let response: SearchResponse<BookDoc> =
            self.get_json(&url, &Self::search_params(request)).await?;
        let received = response.docs.len();

        let enriched = response.docs.into_iter().map(|doc| async move {
            let author = self.book_author(&doc).await;
            book_record(doc, author)
        });
        let records = join_all(enriched).await.into_iter().flatten().collect();
        Ok((records, received))
    }

    async fn search_authors(
        &self,
        request: &PageRequest,
    ) -> Result<(Vec<ResultRecord>, usize), FetchError> {
        let url = format!("{}/search/authors.json", self.base_url);
        let response: SearchResponse<AuthorDoc> =
            self.get_json(&url, &Self::search_params(request)).await?;
        let received = response.docs.len();
        let records = response.docs.into_iter().filter_map(author_record).collect();
        Ok((records, received))
    }

    /// Display name of a book's first author.
    ///
    /// Uses the name embedded in the search doc when present, otherwise
    /// resolves the first author key. A doc without either, or a failed
    /// lookup, yields the placeholder.
    async fn book_author(&self, doc: &BookDoc) -> String {
        if let Some(name) = doc.author_name.as_ref().and_then(|names| names.first()) {
            return name.clone();
        }
        let Some(key) = doc.author_key.as_ref().and_then(|keys| keys.first()) else {
            return UNKNOWN_AUTHOR.to_string();
        };
        match self.author_name(key).await {
            Ok(name) => name,
            Err(e) => {
                warn!("Author lookup for {} failed, using placeholder: {}", key, e);
                UNKNOWN_AUTHOR.to_string()
            }
        }
    }

    async fn author_name(&self, key: &str) -> Result<String, FetchError> {
        let author = self.fetch_author(key).await?;
        author
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| FetchError::Parse(format!("author {key} has no name")))
    }

    async fn fetch_author(&self, key: &str) -> Result<AuthorResponse, FetchError> {
        let url = format!("{}/authors/{}.json", self.base_url, bare_author_key(key));
        self.get_json(&url, &[]).await
    }

    /// Resolves a credited author, degrading to the placeholder on failure.
    async fn author_ref(&self, key: &str) -> AuthorRef {
        match self.author_name(key).await {
            Ok(name) => AuthorRef {
                key: Some(bare_author_key(key).to_string()),
                name,
            },
            Err(e) => {
                warn!("Author lookup for {} failed, using placeholder: {}", key, e);
                AuthorRef::placeholder()
            }
        }
    }

    /// Fetches a work with all credited authors resolved best-effort.
    pub async fn book_details(&self, key: &str) -> Result<BookDetails, FetchError> {
        let path = if key.starts_with('/') {
            key.to_string()
        } else {
            format!("/works/{key}")
        };
        let url = format!("{}{}.json", self.base_url, path);
        info!("Open Library book details: {}", url);
        let work: WorkResponse = self.get_json(&url, &[]).await?;

        let authors = join_all(work.authors.iter().map(|a| self.author_ref(&a.author.key))).await;

        Ok(BookDetails {
            key: path,
            title: work.title.unwrap_or_else(|| UNTITLED.to_string()),
            description: work.description.map(TextValue::into_text),
            subjects: work.subjects,
            first_publish_date: work.first_publish_date,
            cover_ids: work.covers.into_iter().filter(|id| *id > 0).collect(),
            authors,
        })
    }

    pub async fn author_details(&self, key: &str) -> Result<AuthorDetails, FetchError> {
        info!("Open Library author details: {}", key);
        let author = self.fetch_author(key).await?;
        Ok(AuthorDetails {
            key: bare_author_key(key).to_string(),
            name: author.name.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            fuller_name: author.fuller_name,
            birth_date: author.birth_date,
            death_date: author.death_date,
            bio: author.bio.map(TextValue::into_text),
            photo_ids: author.photos.into_iter().filter(|id| *id > 0).collect(),
            links: author
                .links
                .into_iter()
                .map(|link| AuthorLink {
                    title: link.title.unwrap_or_else(|| link.url.clone()),
                    url: link.url,
                })
                .collect(),
        })
    }
}

#[async_trait]
impl CatalogSource for OpenLibrary {
    fn name(&self) -> &str {
        "openlibrary"
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult, FetchError> {
        if request.query.trim().is_empty() {
            return Err(FetchError::EmptyQuery);
        }

        info!(
            "Open Library {} search: q={:?}, page={}, sort={:?}, generation={}",
            request.kind, request.query, request.page, request.sort, request.generation
        );

        let (records, received) = match request.kind {
            EntityKind::Books => self.search_books(request).await?,
            EntityKind::Authors => self.search_authors(request).await?,
        };

        debug!(
            "Parsed {} of {} {} docs for generation {}",
            records.len(),
            received,
            request.kind,
            request.generation
        );

        Ok(PageResult {
            records,
            received,
            generation: request.generation,
            page: request.page,
        })
    }
}
