//! Tree-sitter backed grammar engine.
//!
//! Each line is parsed on its own. Grammars are compiled once at startup;
//! the per-call `Highlighter` and `Parser` are cheap and are created on the
//! calling thread, so the engine itself is `Sync` without any locking.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use tree_sitter::{Node, Parser};
use tree_sitter_highlight::{HighlightConfiguration, Highlighter as TsHighlighter};

use crate::languages::{self, Language};
use crate::markup::{self, Rendered, CAPTURE_NAMES};
use crate::{GrammarEngine, LineMarkup, SyntaxError};

/// Default CSS class prefix, matching highlight.js themes.
pub const DEFAULT_CLASS_PREFIX: &str = "hljs-";

/// Longest line (in bytes) that automatic detection will try every grammar on.
///
/// Error recovery on long garbage lines is superlinear, and detection runs
/// it once per grammar.
pub const MAX_AUTO_DETECT_LEN: usize = 2048;

/// A compiled grammar.
struct Grammar {
    language: tree_sitter::Language,
    config: HighlightConfiguration,
}

/// Grammar engine backed by tree-sitter highlight queries.
pub struct TreeSitterEngine {
    grammars: HashMap<String, Grammar>,
    /// Registration order, used as the tie-breaker in automatic mode.
    order: Vec<String>,
    class_prefix: String,
}

impl TreeSitterEngine {
    /// Creates an engine with no grammars.
    pub fn empty() -> Self {
        Self {
            grammars: HashMap::new(),
            order: Vec::new(),
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
        }
    }

    /// Creates an engine with every bundled grammar.
    ///
    /// A grammar whose queries fail to compile is skipped with a warning.
    pub fn new() -> Self {
        let mut engine = Self::empty();
        for language in languages::builtin() {
            let name = language.name;
            if let Err(e) = engine.register(language) {
                tracing::warn!("Skipping grammar {}: {}", name, e);
            }
        }
        tracing::debug!("Registered {} grammars", engine.order.len());
        engine
    }

    /// Sets the CSS class prefix used in generated markup.
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    /// Registers a grammar, replacing any grammar with the same name.
    pub fn register(&mut self, language: Language) -> Result<(), SyntaxError> {
        let mut config = HighlightConfiguration::new(
            language.ts_language.clone(),
            language.name,
            &language.highlights_query,
            "",
            language.locals_query,
        )
        .map_err(|e| SyntaxError::QueryError(e.to_string()))?;
        config.configure(CAPTURE_NAMES);

        let name = language.name.to_string();
        if !self.grammars.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.grammars.insert(
            name,
            Grammar {
                language: language.ts_language,
                config,
            },
        );
        Ok(())
    }

    /// Looks up a grammar by identifier or alias.
    fn grammar(&self, lang: &str) -> Option<&Grammar> {
        let lower = lang.to_ascii_lowercase();
        self.grammars.get(languages::canonical_name(&lower))
    }

    fn render(
        &self,
        grammar: &Grammar,
        line: &str,
        cancel: Option<&AtomicUsize>,
    ) -> Result<Rendered, SyntaxError> {
        let mut highlighter = TsHighlighter::new();
        let events = highlighter.highlight(&grammar.config, line.as_bytes(), cancel, |_| None)?;
        markup::render(line, events, &self.class_prefix)
    }

    /// Highlights with every grammar that parses `line` cleanly and keeps the
    /// one producing the most highlighted ranges.
    ///
    /// Lines longer than [`MAX_AUTO_DETECT_LEN`] are returned as plain text.
    fn highlight_auto(
        &self,
        line: &str,
        cancel: Option<&AtomicUsize>,
    ) -> Result<LineMarkup, SyntaxError> {
        if line.len() > MAX_AUTO_DETECT_LEN {
            tracing::debug!("Skipping detection for a {} byte line", line.len());
            return Ok(LineMarkup::plain(line));
        }

        let mut parser = Parser::new();
        let mut best: Option<(&str, Rendered)> = None;

        for name in &self.order {
            check_cancelled(cancel)?;
            let Some(grammar) = self.grammars.get(name) else {
                continue;
            };
            if parser.set_language(&grammar.language).is_err() {
                continue;
            }
            let Some(tree) = parser.parse(line, None) else {
                continue;
            };
            if count_errors(tree.root_node()) > 0 {
                continue;
            }
            let rendered = match self.render(grammar, line, cancel) {
                Ok(rendered) if rendered.captures > 0 => rendered,
                Err(SyntaxError::Cancelled) => return Err(SyntaxError::Cancelled),
                _ => continue,
            };
            let better = best
                .as_ref()
                .is_none_or(|(_, current)| rendered.captures > current.captures);
            if better {
                best = Some((name.as_str(), rendered));
            }
        }

        Ok(match best {
            Some((name, rendered)) => LineMarkup {
                markup: rendered.html,
                guessed_language: Some(name.to_string()),
            },
            None => LineMarkup::plain(line),
        })
    }

    fn highlight(
        &self,
        line: &str,
        language: Option<&str>,
        cancel: Option<&AtomicUsize>,
    ) -> Result<LineMarkup, SyntaxError> {
        check_cancelled(cancel)?;
        match language {
            Some(lang) => {
                let grammar = self
                    .grammar(lang)
                    .ok_or_else(|| SyntaxError::UnknownLanguage(lang.to_string()))?;
                let rendered = self.render(grammar, line, cancel)?;
                Ok(LineMarkup {
                    markup: rendered.html,
                    guessed_language: None,
                })
            }
            None => self.highlight_auto(line, cancel),
        }
    }
}

impl Default for TreeSitterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarEngine for TreeSitterEngine {
    fn highlight_line(
        &self,
        line: &str,
        language: Option<&str>,
    ) -> Result<LineMarkup, SyntaxError> {
        self.highlight(line, language, None)
    }

    fn highlight_line_cancellable(
        &self,
        line: &str,
        language: Option<&str>,
        cancel: &AtomicUsize,
    ) -> Result<LineMarkup, SyntaxError> {
        self.highlight(line, language, Some(cancel))
    }

    fn languages(&self) -> Vec<String> {
        self.order.clone()
    }
}

fn check_cancelled(cancel: Option<&AtomicUsize>) -> Result<(), SyntaxError> {
    match cancel {
        Some(flag) if flag.load(Ordering::Relaxed) != 0 => Err(SyntaxError::Cancelled),
        _ => Ok(()),
    }
}

/// Counts error and missing nodes in a syntax tree.
fn count_errors(node: Node) -> usize {
    if !node.has_error() {
        return 0;
    }
    let own = usize::from(node.is_error() || node.is_missing());

    let mut cursor = node.walk();
    let children: usize = node.children(&mut cursor).map(count_errors).sum();
    own + children
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_highlighting() {
        let engine = TreeSitterEngine::new();
        let out = engine
            .highlight_line("def main(): return 1", Some("python"))
            .unwrap();

        assert!(out.markup.contains("<span class=\"hljs-keyword\">def</span>"));
        assert!(out.guessed_language.is_none());
    }

    #[test]
    fn test_alias_resolves() {
        let engine = TreeSitterEngine::new();
        assert!(engine.highlight_line("let x = 1;", Some("js")).is_ok());
        assert!(engine.highlight_line("let x = 1;", Some("JavaScript")).is_ok());
    }

    #[test]
    fn test_markup_is_escaped() {
        let engine = TreeSitterEngine::new();
        let out = engine
            .highlight_line("if a < b: pass", Some("python"))
            .unwrap();
        assert!(out.markup.contains("&lt;"));
        assert!(!out.markup.contains(" < "));
    }

    #[test]
    fn test_unknown_language() {
        let engine = TreeSitterEngine::new();
        let result = engine.highlight_line("x", Some("unknown_lang"));
        assert!(matches!(result, Err(SyntaxError::UnknownLanguage(_))));
    }

    #[test]
    fn test_custom_class_prefix() {
        let engine = TreeSitterEngine::new().with_class_prefix("ts-");
        let out = engine.highlight_line("fn main() {}", Some("rust")).unwrap();
        assert!(out.markup.contains("class=\"ts-"));
        assert!(!out.markup.contains("hljs-"));
    }

    #[test]
    fn test_auto_detection_guesses_a_language() {
        let engine = TreeSitterEngine::new();
        let out = engine.highlight_line("{\"key\": [1, 2, true]}", None).unwrap();
        assert!(out.guessed_language.is_some());
        assert!(out.markup.contains("<span"));
    }

    #[test]
    fn test_auto_detection_without_match_is_plain() {
        let engine = TreeSitterEngine::empty();
        let out = engine.highlight_line("a < b", None).unwrap();
        assert_eq!(out.markup, "a &lt; b");
        assert!(out.guessed_language.is_none());
    }

    #[test]
    fn test_long_line_skips_detection() {
        let engine = TreeSitterEngine::new();
        let line = "[1,".repeat(100_000);

        let out = engine.highlight_line(&line, None).unwrap();
        assert_eq!(out.markup, line);
        assert!(out.guessed_language.is_none());
    }

    #[test]
    fn test_cancelled_flag_stops_work() {
        let engine = TreeSitterEngine::new();
        let cancel = AtomicUsize::new(1);
        let line = "f(".repeat(100_000);

        let explicit = engine.highlight_line_cancellable(&line, Some("python"), &cancel);
        assert!(matches!(explicit, Err(SyntaxError::Cancelled)));

        let auto = engine.highlight_line_cancellable("x = 1", None, &cancel);
        assert!(matches!(auto, Err(SyntaxError::Cancelled)));
    }

    #[test]
    fn test_unset_flag_highlights_normally() {
        let engine = TreeSitterEngine::new();
        let cancel = AtomicUsize::new(0);
        let out = engine
            .highlight_line_cancellable("fn main() {}", Some("rust"), &cancel)
            .unwrap();
        assert!(out.markup.contains("<span"));
    }

    #[test]
    fn test_languages_lists_registered() {
        let engine = TreeSitterEngine::new();
        let langs = engine.languages();
        assert!(langs.iter().any(|l| l == "python"));
        assert!(langs.iter().any(|l| l == "rust"));
    }
}
