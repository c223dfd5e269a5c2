//! HTML markup rendering for highlight events.
//!
//! Output is always safe to embed in an HTML document: source text is
//! escaped and only `<span class="...">` tags are emitted.

use tree_sitter_highlight::HighlightEvent;

use crate::SyntaxError;

/// Standard capture names used by tree-sitter highlight queries.
///
/// Highlight indices reported by tree-sitter-highlight point into this list.
pub const CAPTURE_NAMES: &[&str] = &[
    "attribute",
    "boolean",
    "comment",
    "comment.documentation",
    "constant",
    "constant.builtin",
    "constructor",
    "embedded",
    "escape",
    "function",
    "function.builtin",
    "function.call",
    "function.macro",
    "function.method",
    "keyword",
    "keyword.control",
    "keyword.function",
    "keyword.operator",
    "keyword.return",
    "label",
    "module",
    "namespace",
    "number",
    "operator",
    "property",
    "punctuation",
    "punctuation.bracket",
    "punctuation.delimiter",
    "punctuation.special",
    "string",
    "string.escape",
    "string.regexp",
    "string.special",
    "string.special.key",
    "tag",
    "tag.error",
    "type",
    "type.builtin",
    "variable",
    "variable.builtin",
    "variable.parameter",
];

/// Appends `text` to `out`, escaping HTML metacharacters.
pub fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
}

/// Returns an escaped copy of `text`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

/// The CSS class for a capture name: `function.builtin` -> `{prefix}function-builtin`.
pub fn class_name(prefix: &str, capture: &str) -> String {
    format!("{}{}", prefix, capture.replace('.', "-"))
}

/// Rendered markup plus the number of highlighted ranges it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    pub captures: usize,
}

/// Renders a stream of highlight events over `source` into HTML.
pub fn render<I>(source: &str, events: I, class_prefix: &str) -> Result<Rendered, SyntaxError>
where
    I: IntoIterator<Item = Result<HighlightEvent, tree_sitter_highlight::Error>>,
{
    let mut html = String::with_capacity(source.len() * 2);
    let mut captures = 0;
    let mut open = 0usize;

    for event in events {
        match event? {
            HighlightEvent::Source { start, end } => {
                let text = source
                    .get(start..end)
                    .ok_or_else(|| SyntaxError::Highlight(format!("bad range {start}..{end}")))?;
                escape_into(&mut html, text);
            }
            HighlightEvent::HighlightStart(highlight) => {
                let capture = CAPTURE_NAMES.get(highlight.0).copied().unwrap_or("text");
                html.push_str("<span class=\"");
                html.push_str(&class_name(class_prefix, capture));
                html.push_str("\">");
                captures += 1;
                open += 1;
            }
            HighlightEvent::HighlightEnd => {
                if open > 0 {
                    html.push_str("</span>");
                    open -= 1;
                }
            }
        }
    }

    // A cancelled or truncated stream must not leave dangling tags.
    for _ in 0..open {
        html.push_str("</span>");
    }

    Ok(Rendered { html, captures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter_highlight::Highlight;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b && c > \"d\""), "a &lt; b &amp;&amp; c &gt; &quot;d&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("hljs-", "keyword"), "hljs-keyword");
        assert_eq!(class_name("hljs-", "function.builtin"), "hljs-function-builtin");
    }

    #[test]
    fn test_render_events() {
        let source = "if x<1";
        let keyword = CAPTURE_NAMES.iter().position(|c| *c == "keyword").unwrap();
        let events = vec![
            Ok(HighlightEvent::HighlightStart(Highlight(keyword))),
            Ok(HighlightEvent::Source { start: 0, end: 2 }),
            Ok(HighlightEvent::HighlightEnd),
            Ok(HighlightEvent::Source { start: 2, end: 6 }),
        ];

        let rendered = render(source, events, "hljs-").unwrap();
        assert_eq!(rendered.html, "<span class=\"hljs-keyword\">if</span> x&lt;1");
        assert_eq!(rendered.captures, 1);
    }

    #[test]
    fn test_render_closes_dangling_spans() {
        let events = vec![
            Ok(HighlightEvent::HighlightStart(Highlight(0))),
            Ok(HighlightEvent::Source { start: 0, end: 1 }),
        ];
        let rendered = render("x", events, "").unwrap();
        assert_eq!(rendered.html, "<span class=\"attribute\">x</span>");
    }
}
