//! Request and response types.

use serde::{Deserialize, Serialize};

/// Sentinel language reported when nothing could be resolved.
pub const PLAINTEXT: &str = "plaintext";

/// A snippet to highlight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRequest {
    /// Source code, possibly empty
    pub code: String,

    /// Explicit language; wins over the filename when non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Filename used to infer the language from its extension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl HighlightRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: None,
            filename: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// The explicit language, if one was given.
    pub fn explicit_language(&self) -> Option<&str> {
        self.language.as_deref().filter(|l| !l.is_empty())
    }

    /// The filename, if one was given.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref().filter(|f| !f.is_empty())
    }
}

/// Highlighted output, line for line with the request's code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightResponse {
    pub highlighted: String,
    pub detected_language: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserialization() {
        let request: HighlightRequest =
            serde_json::from_str(r#"{"code": "x = 1", "filename": "a.py"}"#).unwrap();
        assert_eq!(request.code, "x = 1");
        assert_eq!(request.filename(), Some("a.py"));
        assert!(request.language.is_none());
    }

    #[test]
    fn test_request_requires_code() {
        let result: Result<HighlightRequest, _> = serde_json::from_str(r#"{"language": "go"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_language_is_absent() {
        let request = HighlightRequest::new("x").with_language("");
        assert!(request.explicit_language().is_none());
    }

    #[test]
    fn test_response_field_names() {
        let response = HighlightResponse {
            highlighted: "x".to_string(),
            detected_language: PLAINTEXT.to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["detectedLanguage"], "plaintext");
        assert_eq!(json["highlighted"], "x");
    }
}
