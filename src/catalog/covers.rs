//! Image reference resolution. A record without an image passes through as `None`
//! and the caller renders its own placeholder.

use crate::EntityKind;

pub const DEFAULT_COVERS_URL: &str = "https://covers.openlibrary.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSize {
    Small,
    Medium,
    Large,
}

impl CoverSize {
    fn suffix(&self) -> &'static str {
        match self {
            CoverSize::Small => "S",
            CoverSize::Medium => "M",
            CoverSize::Large => "L",
        }
    }
}

/// Builds the image URL for a record's `image_ref`.
///
/// Books are addressed by cover id, authors by their Open Library id.
pub fn image_url(
    covers_url: &str,
    kind: EntityKind,
    image_ref: Option<&str>,
    size: CoverSize,
) -> Option<String> {
    let id = image_ref.map(str::trim).filter(|id| !id.is_empty())?;
    let base = covers_url.trim_end_matches('/');
    let url = match kind {
        EntityKind::Books => format!("{base}/b/id/{id}-{}.jpg", size.suffix()),
        EntityKind::Authors => format!(
            "{base}/a/olid/{}-{}.jpg",
            id.trim_start_matches("/authors/"),
            size.suffix()
        ),
    };
    Some(url)
}
