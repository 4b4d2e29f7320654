pub mod covers;
pub mod details;
pub mod source;
pub mod sources;
pub mod types;

pub use details::{AuthorDetails, AuthorRef, BookDetails};
pub use source::{CatalogSource, FetchError};
pub use sources::OpenLibrary;
pub use types::{PAGE_SIZE, PageRequest, PageResult, ResultRecord, SortKey};
