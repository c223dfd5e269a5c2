//! Filename-based language resolution.

use std::collections::HashMap;

/// Built-in extension table: (extension, language identifier).
const DEFAULT_EXTENSIONS: &[(&str, &str)] = &[
    // Systems and application languages
    ("rs", "rust"),
    ("go", "go"),
    ("c", "c"),
    ("h", "c"),
    ("cc", "cpp"),
    ("cpp", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("hh", "cpp"),
    ("cs", "csharp"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("scala", "scala"),
    ("swift", "swift"),
    ("m", "objectivec"),
    ("zig", "zig"),
    ("hs", "haskell"),
    ("ml", "ocaml"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("erl", "erlang"),
    ("clj", "clojure"),
    ("dart", "dart"),
    // Scripting
    ("py", "python"),
    ("pyw", "python"),
    ("rb", "ruby"),
    ("php", "php"),
    ("pl", "perl"),
    ("lua", "lua"),
    ("r", "r"),
    ("sh", "bash"),
    ("bash", "bash"),
    ("zsh", "bash"),
    ("ps1", "powershell"),
    ("sql", "sql"),
    // Web
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("mts", "typescript"),
    ("cts", "typescript"),
    ("tsx", "tsx"),
    ("html", "html"),
    ("htm", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("less", "less"),
    ("vue", "xml"),
    ("svg", "xml"),
    // Configuration and markup
    ("json", "json"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("ini", "ini"),
    ("cfg", "ini"),
    ("xml", "xml"),
    ("md", "markdown"),
    ("markdown", "markdown"),
    ("mk", "makefile"),
    ("proto", "protobuf"),
    ("graphql", "graphql"),
    ("tex", "latex"),
];

/// Mapping from lowercase file extension (no dot) to language identifier.
///
/// Set once when the highlighter is built and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageMap {
    extensions: HashMap<String, String>,
}

impl LanguageMap {
    /// Creates a map from explicit entries. Keys are lowercased and any
    /// leading dot is dropped.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let extensions = entries
            .into_iter()
            .map(|(ext, lang)| (normalize_extension(ext.as_ref()), lang.into()))
            .collect();
        Self { extensions }
    }

    /// Returns a copy of this map with `overrides` layered on top.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (ext, lang) in overrides {
            self.extensions
                .insert(normalize_extension(ext.as_ref()), lang.into());
        }
        self
    }

    /// Looks up an extension (case-insensitive, without the dot).
    pub fn get(&self, extension: &str) -> Option<&str> {
        self.extensions
            .get(&extension.to_lowercase())
            .map(String::as_str)
    }

    /// Resolves a filename to a language identifier.
    ///
    /// Uses the text after the last `.`; a filename with no dot, or an
    /// unmapped extension, resolves to `None`.
    pub fn resolve(&self, filename: &str) -> Option<&str> {
        let (_, extension) = filename.rsplit_once('.')?;
        self.get(extension)
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl Default for LanguageMap {
    fn default() -> Self {
        Self::from_entries(DEFAULT_EXTENSIONS.iter().copied())
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}
