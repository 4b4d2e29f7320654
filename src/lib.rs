//! Folio library exports for testing

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod browser;
pub mod catalog;
pub mod core;

#[cfg(test)]
pub mod test_support;

/// The kind of catalog entity a search session lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Books,
    Authors,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Books => "books",
            EntityKind::Authors => "authors",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
