//! # Linelight Core
//!
//! The highlight pipeline and the state it owns.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       Highlighter                        │
//! │  ┌──────────────┐  ┌───────────────┐  ┌────────────────┐ │
//! │  │ LanguageMap  │  │  ResultCache  │  │ GrammarEngine  │ │
//! │  │ (ext → lang) │  │ (FIFO, bound) │  │ (dyn, per line)│ │
//! │  └──────────────┘  └───────────────┘  └────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LanguageMap` and the cache capacity are injected when the
//! `Highlighter` is built; nothing here reads global state.

pub mod cache;
pub mod config;
pub mod highlighter;
pub mod language;
pub mod request;

pub use cache::{Fingerprint, ResultCache};
pub use config::{Config, ConfigError};
pub use highlighter::{CacheStats, Cancelled, Highlighter};
pub use language::LanguageMap;
pub use request::{HighlightRequest, HighlightResponse, PLAINTEXT};
