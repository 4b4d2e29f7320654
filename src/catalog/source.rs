use std::fmt;

use async_trait::async_trait;

use super::types::{PageRequest, PageResult};

/// Errors that can occur while fetching a page from the catalog.
/// None of them are retried here; the caller decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network-level failure (timeout, DNS, connection refused).
    Transport(String),
    /// The catalog answered with a non-success status.
    Api { status: u16, message: String },
    /// The body could not be parsed into records.
    Parse(String),
    /// The query is blank. A no-op signal rather than a failure.
    EmptyQuery,
}

impl FetchError {
    /// True for failures of the transport itself, including non-2xx answers.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Api { .. })
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "network error: {msg}"),
            FetchError::Api { status, message } => {
                write!(f, "catalog error (HTTP {status}): {message}")
            }
            FetchError::Parse(msg) => write!(f, "parse error: {msg}"),
            FetchError::EmptyQuery => write!(f, "empty query"),
        }
    }
}

impl std::error::Error for FetchError {}

/// A remote catalog that can serve result pages.
///
/// Implementations issue exactly one logical request per call and make no
/// ordering promise between concurrent calls. Callers compare the
/// `generation` echoed in [`PageResult`] to discard stale pages.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Returns the name of the catalog.
    fn name(&self) -> &str;

    /// Fetches one page of records for the given request.
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_grouping() {
        assert!(FetchError::Transport("timeout".into()).is_transport());
        assert!(
            FetchError::Api {
                status: 503,
                message: "busy".into()
            }
            .is_transport()
        );
        assert!(!FetchError::Parse("bad".into()).is_transport());
        assert!(!FetchError::EmptyQuery.is_transport());
    }

    #[test]
    fn test_display_includes_status() {
        let err = FetchError::Api {
            status: 404,
            message: "not found".into(),
        };
        assert_eq!(err.to_string(), "catalog error (HTTP 404): not found");
    }
}
