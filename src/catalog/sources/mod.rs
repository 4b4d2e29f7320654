pub mod openlibrary;

pub use openlibrary::OpenLibrary;
