//! Annotation directive grammar.
//!
//! A directive is a comment containing `enumcover:` immediately followed by a
//! type token, e.g. `// enumcover:Color` or `/* enumcover:shapes::Kind */`.
//! Any comment that mentions the marker without matching the grammar is
//! malformed.

use regex::Regex;
use std::sync::OnceLock;

/// Fixed marker keyword.
pub const MARKER: &str = "enumcover";

/// Result of inspecting a single comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentClass {
    /// Well-formed directive carrying its type token.
    Directive(String),
    /// Mentions the marker but does not match the grammar.
    Malformed,
}

fn directive_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"enumcover:([\w.]+(?:::[\w.]+)*)").expect("Hardcoded regex pattern is valid")
    })
}

/// Cheap pre-filter: files without the marker are skipped before parsing.
pub fn has_marker(content: &str) -> bool {
    content.contains(MARKER)
}

/// Classify the raw text of a comment. Returns `None` for ordinary comments.
pub fn classify_comment(text: &str) -> Option<CommentClass> {
    if !has_marker(text) {
        return None;
    }
    match directive_regex().captures(text).and_then(|c| c.get(1)) {
        Some(token) => Some(CommentClass::Directive(token.as_str().trim().to_string())),
        None => Some(CommentClass::Malformed),
    }
}

/// Split a type token into segments. Both `.` and `::` separate segments.
pub fn token_segments(token: &str) -> Vec<&str> {
    token
        .split("::")
        .flat_map(|part| part.split('.'))
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_directives() {
        assert_eq!(
            classify_comment("// enumcover:Color"),
            Some(CommentClass::Directive("Color".to_string()))
        );
        assert_eq!(
            classify_comment("/* enumcover:sh.Kind */"),
            Some(CommentClass::Directive("sh.Kind".to_string()))
        );
        assert_eq!(
            classify_comment("// check enumcover:crate::shapes::Kind please"),
            Some(CommentClass::Directive("crate::shapes::Kind".to_string()))
        );
    }

    #[test]
    fn test_malformed_directives() {
        assert_eq!(
            classify_comment("// enumcover: Color"),
            Some(CommentClass::Malformed)
        );
        assert_eq!(classify_comment("// enumcover"), Some(CommentClass::Malformed));
    }

    #[test]
    fn test_ordinary_comment_is_ignored() {
        assert_eq!(classify_comment("// handles every color"), None);
        assert!(!has_marker("fn main() {}"));
    }

    #[test]
    fn test_token_segments() {
        assert_eq!(token_segments("Color"), vec!["Color"]);
        assert_eq!(token_segments("sh.Kind"), vec!["sh", "Kind"]);
        assert_eq!(token_segments("crate::a::Kind"), vec!["crate", "a", "Kind"]);
    }
}
