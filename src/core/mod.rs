//! # Core Search Engine
//!
//! This module contains Folio's incremental search-and-pagination logic.
//! It knows nothing about terminals, HTTP or timers.
//!
//! ```text
//!   keystrokes ──► query (debounce) ──► catalog fetch ──► accumulator ──► list
//!                        ▲                                                 │
//!                        └────────────── pagination (scroll) ◄─────────────┘
//! ```
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • SearchSession        │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                    ┌───────────┴───────────┐
//!                    ▼                       ▼
//!             ┌────────────┐          ┌────────────┐
//!             │  Browser   │          │    CLI     │
//!             │  runtime   │          │  (main)    │
//!             │  (tokio)   │          │            │
//!             └────────────┘          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `SearchSession` struct and engine settings
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`query`]: Query/sort changes and the debouncer
//! - [`accumulator`]: Merging, deduplication and ordering of pages
//! - [`pagination`]: Scroll triggers and the status machine
//! - [`config`]: Configuration file and override resolution

pub mod accumulator;
pub mod action;
pub mod config;
pub mod pagination;
pub mod query;
pub mod state;

pub use action::{Action, Effect, update};
pub use state::{EngineSettings, SearchSession, Status};
