//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.folio/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::EntityKind;
use crate::catalog::covers::DEFAULT_COVERS_URL;
use crate::catalog::sources::openlibrary::DEFAULT_BASE_URL;
use crate::catalog::{PAGE_SIZE, SortKey};
use crate::core::state::{
    DEFAULT_AUTHOR_MIN_QUERY_LEN, DEFAULT_BOOK_MIN_QUERY_LEN, DEFAULT_DEBOUNCE,
    DEFAULT_SCROLL_THRESHOLD, EngineSettings,
};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub books: ListingConfig,
    #[serde(default)]
    pub authors: ListingConfig,
    #[serde(default)]
    pub access: AccessConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub debounce_ms: Option<u64>,
    pub scroll_threshold: Option<f32>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    pub base_url: Option<String>,
    pub covers_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ListingConfig {
    pub min_query_len: Option<usize>,
    pub default_sort: Option<SortKey>,
}

/// Permission set handed over by the sign-in layer.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AccessConfig {
    pub kinds: Option<Vec<EntityKind>>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub covers_url: String,
    pub debounce: Duration,
    pub scroll_threshold: f32,
    pub request_timeout: Duration,
    pub book_min_query_len: usize,
    pub author_min_query_len: usize,
    pub book_sort: SortKey,
    pub author_sort: SortKey,
    pub permitted: Vec<EntityKind>,
}

impl ResolvedConfig {
    /// Engine settings for one listing.
    pub fn engine_settings(&self, kind: EntityKind) -> EngineSettings {
        let min_query_len = match kind {
            EntityKind::Books => self.book_min_query_len,
            EntityKind::Authors => self.author_min_query_len,
        };
        EngineSettings {
            page_size: PAGE_SIZE,
            min_query_len,
            debounce: self.debounce,
            scroll_threshold: self.scroll_threshold,
        }
    }

    pub fn default_sort(&self, kind: EntityKind) -> SortKey {
        match kind {
            EntityKind::Books => self.book_sort,
            EntityKind::Authors => self.author_sort,
        }
    }

    /// Whether the permission set allows a session for `kind`.
    pub fn permits(&self, kind: EntityKind) -> bool {
        self.permitted.contains(&kind)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.folio/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".folio").join("config.toml"))
}

/// Load config from `~/.folio/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `FolioConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<FolioConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(FolioConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(FolioConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: FolioConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Folio Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# debounce_ms = 500                  # Or set FOLIO_DEBOUNCE_MS
# scroll_threshold = 0.5             # Viewports of remaining content that trigger the next page
# request_timeout_secs = 15

# [catalog]
# base_url = "https://openlibrary.org"   # Or set FOLIO_BASE_URL
# covers_url = "https://covers.openlibrary.org"

# [books]
# min_query_len = 3
# default_sort = "primary"           # "primary" (title) or "secondary" (publish year)

# [authors]
# min_query_len = 0
# default_sort = "primary"           # "primary" (name) or "secondary" (birth date)

# [access]
# kinds = ["books", "authors"]
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Values that came from CLI flags (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub debounce_ms: Option<u64>,
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &FolioConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| std::env::var("FOLIO_BASE_URL").ok())
        .or_else(|| config.catalog.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Debounce: CLI → env → config → default
    let debounce = cli
        .debounce_ms
        .or_else(|| {
            std::env::var("FOLIO_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
        })
        .or(config.general.debounce_ms)
        .map_or(DEFAULT_DEBOUNCE, Duration::from_millis);

    let scroll_threshold = config
        .general
        .scroll_threshold
        .filter(|t| t.is_finite() && *t >= 0.0)
        .unwrap_or(DEFAULT_SCROLL_THRESHOLD);

    let permitted = config
        .access
        .kinds
        .clone()
        .unwrap_or_else(|| vec![EntityKind::Books, EntityKind::Authors]);

    ResolvedConfig {
        base_url,
        covers_url: config
            .catalog
            .covers_url
            .clone()
            .unwrap_or_else(|| DEFAULT_COVERS_URL.to_string()),
        debounce,
        scroll_threshold,
        request_timeout: Duration::from_secs(
            config
                .general
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        ),
        book_min_query_len: config
            .books
            .min_query_len
            .unwrap_or(DEFAULT_BOOK_MIN_QUERY_LEN),
        author_min_query_len: config
            .authors
            .min_query_len
            .unwrap_or(DEFAULT_AUTHOR_MIN_QUERY_LEN),
        book_sort: config.books.default_sort.unwrap_or_default(),
        author_sort: config.authors.default_sort.unwrap_or_default(),
        permitted,
    }
}
