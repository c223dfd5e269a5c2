//! Built-in tree-sitter grammars.
//!
//! Each grammar crate ships its own highlight queries; we only pair them
//! with the canonical identifier the rest of the service uses.

use tree_sitter::Language as TsLanguage;

/// A grammar that can be registered with the engine.
pub struct Language {
    /// Canonical identifier (e.g., "python", "typescript")
    pub name: &'static str,
    /// Tree-sitter language grammar
    pub ts_language: TsLanguage,
    /// Highlight queries (tree-sitter query syntax)
    pub highlights_query: String,
    /// Locals queries (optional)
    pub locals_query: &'static str,
}

pub fn rust() -> Language {
    Language {
        name: "rust",
        ts_language: tree_sitter_rust::LANGUAGE.into(),
        highlights_query: tree_sitter_rust::HIGHLIGHTS_QUERY.to_string(),
        locals_query: "",
    }
}

pub fn javascript() -> Language {
    Language {
        name: "javascript",
        ts_language: tree_sitter_javascript::LANGUAGE.into(),
        highlights_query: tree_sitter_javascript::HIGHLIGHT_QUERY.to_string(),
        locals_query: tree_sitter_javascript::LOCALS_QUERY,
    }
}

/// TypeScript's own query only covers what it adds on top of JavaScript,
/// so the two are concatenated (TypeScript first so its patterns win).
pub fn typescript() -> Language {
    Language {
        name: "typescript",
        ts_language: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        highlights_query: format!(
            "{}\n{}",
            tree_sitter_typescript::HIGHLIGHTS_QUERY,
            tree_sitter_javascript::HIGHLIGHT_QUERY
        ),
        locals_query: "",
    }
}

pub fn tsx() -> Language {
    Language {
        name: "tsx",
        ts_language: tree_sitter_typescript::LANGUAGE_TSX.into(),
        highlights_query: format!(
            "{}\n{}\n{}",
            tree_sitter_typescript::HIGHLIGHTS_QUERY,
            tree_sitter_javascript::JSX_HIGHLIGHT_QUERY,
            tree_sitter_javascript::HIGHLIGHT_QUERY
        ),
        locals_query: "",
    }
}

pub fn python() -> Language {
    Language {
        name: "python",
        ts_language: tree_sitter_python::LANGUAGE.into(),
        highlights_query: tree_sitter_python::HIGHLIGHTS_QUERY.to_string(),
        locals_query: "",
    }
}

pub fn go() -> Language {
    Language {
        name: "go",
        ts_language: tree_sitter_go::LANGUAGE.into(),
        highlights_query: tree_sitter_go::HIGHLIGHTS_QUERY.to_string(),
        locals_query: "",
    }
}

pub fn json() -> Language {
    Language {
        name: "json",
        ts_language: tree_sitter_json::LANGUAGE.into(),
        highlights_query: tree_sitter_json::HIGHLIGHTS_QUERY.to_string(),
        locals_query: "",
    }
}

pub fn html() -> Language {
    Language {
        name: "html",
        ts_language: tree_sitter_html::LANGUAGE.into(),
        highlights_query: tree_sitter_html::HIGHLIGHTS_QUERY.to_string(),
        locals_query: "",
    }
}

pub fn css() -> Language {
    Language {
        name: "css",
        ts_language: tree_sitter_css::LANGUAGE.into(),
        highlights_query: tree_sitter_css::HIGHLIGHTS_QUERY.to_string(),
        locals_query: "",
    }
}

/// All bundled grammars, in automatic-detection preference order.
pub fn builtin() -> Vec<Language> {
    vec![
        python(),
        javascript(),
        typescript(),
        rust(),
        go(),
        json(),
        css(),
        html(),
        tsx(),
    ]
}

/// Maps common short names onto canonical identifiers.
pub fn canonical_name(lang: &str) -> &str {
    match lang {
        "rs" => "rust",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "ts" => "typescript",
        "py" => "python",
        "golang" => "go",
        other => other,
    }
}
