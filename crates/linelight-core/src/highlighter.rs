//! The highlight pipeline.
//!
//! ```text
//! request ─► cache? ──hit──────────────────────► response
//!              │miss
//!              ▼
//!         resolve language ─► split on '\n'
//!              ─► engine per line (until cancelled) ─► join ─► cache
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use linelight_syntax::{GrammarEngine, LineMarkup, SyntaxError};
use serde::Serialize;

use crate::cache::{Fingerprint, ResultCache, DEFAULT_CAPACITY};
use crate::config::Config;
use crate::language::LanguageMap;
use crate::request::{HighlightRequest, HighlightResponse, PLAINTEXT};

/// Cache occupancy snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
}

/// Returned when a highlight is abandoned through its cancellation flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Highlighting cancelled")]
pub struct Cancelled;

/// Highlights snippets line by line, caching whole responses.
///
/// Shared between request handlers behind an `Arc`; all methods take `&self`.
pub struct Highlighter {
    engine: Arc<dyn GrammarEngine>,
    languages: LanguageMap,
    cache: ResultCache,
}

impl Highlighter {
    /// Creates a highlighter with the built-in language map and default cache size.
    pub fn new(engine: Arc<dyn GrammarEngine>) -> Self {
        Self {
            engine,
            languages: LanguageMap::default(),
            cache: ResultCache::new(DEFAULT_CAPACITY),
        }
    }

    /// Creates a highlighter from the `[cache]` and `[languages]` config sections.
    pub fn from_config(engine: Arc<dyn GrammarEngine>, config: &Config) -> Self {
        Self::new(engine)
            .with_language_map(config.languages.language_map())
            .with_cache_capacity(config.cache.capacity)
    }

    /// Replaces the extension table.
    pub fn with_language_map(mut self, languages: LanguageMap) -> Self {
        self.languages = languages;
        self
    }

    /// Replaces the cache with an empty one of the given capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = ResultCache::new(capacity);
        self
    }

    /// Highlights a request, serving it from the cache when possible.
    pub fn highlight(&self, request: &HighlightRequest) -> Arc<HighlightResponse> {
        let never = AtomicUsize::new(0);
        match self.highlight_cancellable(request, &never) {
            Ok(response) => response,
            Err(Cancelled) => unreachable!("cancellation flag is local and never set"),
        }
    }

    /// Like [`highlight`](Self::highlight), but stops once `cancel` is non-zero.
    ///
    /// A cancelled call stores nothing in the cache.
    pub fn highlight_cancellable(
        &self,
        request: &HighlightRequest,
        cancel: &AtomicUsize,
    ) -> Result<Arc<HighlightResponse>, Cancelled> {
        let key = Fingerprint::new(
            request.filename(),
            request.explicit_language(),
            &request.code,
        );
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("Cache hit for {}", key);
            return Ok(cached);
        }
        tracing::debug!("Cache miss for {}", key);

        let language = self.effective_language(request);

        let mut failures = Failures::default();
        let mut lines = Vec::new();
        for line in request.code.split('\n') {
            if is_cancelled(cancel) {
                tracing::debug!("Highlight of {} cancelled", key);
                return Err(Cancelled);
            }
            lines.push(self.highlight_line(line, language, cancel, &mut failures)?);
        }
        failures.log(language);

        let response = Arc::new(HighlightResponse {
            highlighted: lines.join("\n"),
            detected_language: language.unwrap_or(PLAINTEXT).to_string(),
        });
        self.cache.put(key, Arc::clone(&response));
        Ok(response)
    }

    /// Explicit language first, then the filename's extension.
    fn effective_language<'a>(&'a self, request: &'a HighlightRequest) -> Option<&'a str> {
        request
            .explicit_language()
            .or_else(|| request.filename().and_then(|f| self.languages.resolve(f)))
    }

    fn highlight_line(
        &self,
        line: &str,
        language: Option<&str>,
        cancel: &AtomicUsize,
        failures: &mut Failures,
    ) -> Result<String, Cancelled> {
        if line.trim().is_empty() {
            return Ok(String::new());
        }
        match self.engine.highlight_line_cancellable(line, language, cancel) {
            Ok(out) => Ok(out.markup),
            Err(SyntaxError::Cancelled) if is_cancelled(cancel) => Err(Cancelled),
            Err(e) => {
                tracing::debug!("Falling back to plain text: {}", e);
                failures.record(&e);
                Ok(LineMarkup::plain(line).markup)
            }
        }
    }

    /// Languages the grammar engine can highlight.
    pub fn languages(&self) -> Vec<String> {
        self.engine.languages()
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            entries: self.cache.len(),
            capacity: self.cache.capacity(),
        }
    }
}

fn is_cancelled(cancel: &AtomicUsize) -> bool {
    cancel.load(Ordering::Relaxed) != 0
}

/// Per-request tally of lines that fell back to plain text.
#[derive(Debug, Default)]
struct Failures {
    unsupported: usize,
    failed: usize,
}

impl Failures {
    fn record(&mut self, error: &SyntaxError) {
        match error {
            SyntaxError::UnknownLanguage(_) => self.unsupported += 1,
            _ => self.failed += 1,
        }
    }

    /// Unsupported languages are routine (the extension table is far larger
    /// than any grammar set); only real engine failures are warnings.
    fn log(&self, language: Option<&str>) {
        let language = language.unwrap_or("auto");
        if self.unsupported > 0 {
            tracing::debug!(
                language,
                lines = self.unsupported,
                "No grammar for language; rendered as plain text"
            );
        }
        if self.failed > 0 {
            tracing::warn!(
                language,
                failed = self.failed,
                "Grammar engine failed on some lines; rendered them as plain text"
            );
        }
    }
}
