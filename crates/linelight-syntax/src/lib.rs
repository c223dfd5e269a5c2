//! # Linelight Syntax
//!
//! Line-oriented syntax highlighting.
//!
//! ## Grammar Engines
//!
//! The rest of the service only sees the [`GrammarEngine`] trait: "highlight
//! this line, in this language if you're told one, otherwise guess". The
//! bundled [`TreeSitterEngine`] implements it with tree-sitter grammars and
//! their highlight queries, producing HTML markup.
//!
//! Lines are independent units. A string or comment that spans several lines
//! is highlighted line by line, without state carried between them.

pub mod engine;
pub mod languages;
pub mod markup;

use std::sync::atomic::{AtomicUsize, Ordering};

pub use engine::{DEFAULT_CLASS_PREFIX, MAX_AUTO_DETECT_LEN, TreeSitterEngine};
pub use languages::Language;
pub use markup::escape_html;

/// Errors that can occur during syntax highlighting.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Highlight error: {0}")]
    Highlight(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Highlighting cancelled")]
    Cancelled,
}

impl From<tree_sitter_highlight::Error> for SyntaxError {
    fn from(e: tree_sitter_highlight::Error) -> Self {
        match e {
            tree_sitter_highlight::Error::Cancelled => SyntaxError::Cancelled,
            other => SyntaxError::Highlight(other.to_string()),
        }
    }
}

/// The result of highlighting one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMarkup {
    /// HTML markup for the line
    pub markup: String,
    /// Best guess of the language, only set in automatic mode
    pub guessed_language: Option<String>,
}

impl LineMarkup {
    /// Unhighlighted markup: the escaped line text.
    pub fn plain(line: &str) -> Self {
        Self {
            markup: escape_html(line),
            guessed_language: None,
        }
    }
}

/// A pluggable line highlighter.
///
/// Implementations must be callable from many threads at once.
pub trait GrammarEngine: Send + Sync {
    /// Highlights a single line.
    ///
    /// With `language` set the line is highlighted in that language; with
    /// `None` the engine picks a language itself and reports its guess.
    fn highlight_line(&self, line: &str, language: Option<&str>)
    -> Result<LineMarkup, SyntaxError>;

    /// Like [`highlight_line`](Self::highlight_line), but gives up with
    /// [`SyntaxError::Cancelled`] once `cancel` is non-zero.
    ///
    /// The default only checks the flag before starting; engines doing real
    /// work should also check it while they run.
    fn highlight_line_cancellable(
        &self,
        line: &str,
        language: Option<&str>,
        cancel: &AtomicUsize,
    ) -> Result<LineMarkup, SyntaxError> {
        if cancel.load(Ordering::Relaxed) != 0 {
            return Err(SyntaxError::Cancelled);
        }
        self.highlight_line(line, language)
    }

    /// Returns the identifiers this engine can highlight.
    fn languages(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_markup() {
        let plain = LineMarkup::plain("<b>");
        assert_eq!(plain.markup, "&lt;b&gt;");
        assert!(plain.guessed_language.is_none());
    }

    #[test]
    fn test_engine_is_object_safe() {
        let engine: Box<dyn GrammarEngine> = Box::new(TreeSitterEngine::empty());
        assert!(engine.languages().is_empty());
    }

    #[test]
    fn test_default_cancellable_checks_flag() {
        let engine = TreeSitterEngine::empty();
        let cancel = AtomicUsize::new(0);
        assert!(engine.highlight_line_cancellable("x", None, &cancel).is_ok());

        cancel.store(1, Ordering::Relaxed);
        let result = engine.highlight_line_cancellable("x", None, &cancel);
        assert!(matches!(result, Err(SyntaxError::Cancelled)));
    }

    #[test]
    fn test_cancelled_highlight_error_maps_to_cancelled() {
        let error = SyntaxError::from(tree_sitter_highlight::Error::Cancelled);
        assert!(matches!(error, SyntaxError::Cancelled));
    }
}
