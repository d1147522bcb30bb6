//! Diagnostics produced by a check run and the sink they are reported to.
//!
//! The message texts are a compatibility surface: editors and CI scripts match
//! on them, so they must not change.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::directive::MARKER;
use crate::types::{NamedConstant, SourceSpan, TypeIdentity};

/// Message emitted when a qualified directive goes through a glob import.
pub const DOT_IMPORTS_UNHANDLED: &str = "Dot imports are unhandled!";

/// Category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MalformedDirective,
    DotImport,
    NoConstants,
    UnhandledConst,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedDirective => "malformed_directive",
            Self::DotImport => "dot_import",
            Self::NoConstants => "no_constants",
            Self::UnhandledConst => "unhandled_const",
        }
    }
}

/// A single finding at a source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub span: SourceSpan,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn malformed_directive(file: impl Into<PathBuf>, span: SourceSpan, raw: &str) -> Self {
        Self {
            file: file.into(),
            span,
            kind: DiagnosticKind::MalformedDirective,
            message: format!(
                "Malformed {m} comment (should be of the form \"{m}:sometypename\"): {raw}",
                m = MARKER
            ),
        }
    }

    pub fn dot_import(file: impl Into<PathBuf>, span: SourceSpan) -> Self {
        Self {
            file: file.into(),
            span,
            kind: DiagnosticKind::DotImport,
            message: DOT_IMPORTS_UNHANDLED.to_string(),
        }
    }

    pub fn no_constants(file: impl Into<PathBuf>, span: SourceSpan, ty: &TypeIdentity) -> Self {
        Self {
            file: file.into(),
            span,
            kind: DiagnosticKind::NoConstants,
            message: no_consts_message(ty),
        }
    }

    pub fn unhandled_const(file: impl Into<PathBuf>, span: SourceSpan, c: &NamedConstant) -> Self {
        Self {
            file: file.into(),
            span,
            kind: DiagnosticKind::UnhandledConst,
            message: unhandled_const_message(c),
        }
    }

    /// Sort key: file, then position, then message.
    fn sort_key(&self) -> (&PathBuf, SourceSpan, &str) {
        (&self.file, self.span, self.message.as_str())
    }
}

/// `No consts found for type <T>`
pub fn no_consts_message(ty: &TypeIdentity) -> String {
    format!("No consts found for type {}", ty)
}

/// `Unhandled const: <name> (<value>)`
pub fn unhandled_const_message(c: &NamedConstant) -> String {
    format!("Unhandled const: {}", c)
}

/// Receiver of diagnostics. Hosts decide what to do with them.
pub trait DiagnosticSink: Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Thread-safe sink that keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Consume the sink, returning diagnostics in a deterministic order.
    pub fn into_sorted(self) -> Vec<Diagnostic> {
        let mut diags = self
            .diagnostics
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        diags.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        diags
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.lock().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(name: &str, value: &str) -> NamedConstant {
        NamedConstant {
            name: name.to_string(),
            value: value.to_string(),
            owner: TypeIdentity::new("crate::Color"),
            path: format!("crate::{}", name),
            module: "crate".to_string(),
            file: PathBuf::from("src/lib.rs"),
            line: 1,
        }
    }

    #[test]
    fn test_message_formats() {
        let span = SourceSpan::new(3, 0, 5, 1);
        let d = Diagnostic::unhandled_const("a.rs", span, &constant("BLUE", "b"));
        assert_eq!(d.message, "Unhandled const: BLUE (b)");

        let d = Diagnostic::no_constants("a.rs", span, &TypeIdentity::new("crate::Thing"));
        assert_eq!(d.message, "No consts found for type crate::Thing");

        let d = Diagnostic::dot_import("a.rs", span);
        assert_eq!(d.message, "Dot imports are unhandled!");

        let d = Diagnostic::malformed_directive("a.rs", span, "// enumcover: Color");
        assert_eq!(
            d.message,
            "Malformed enumcover comment (should be of the form \"enumcover:sometypename\"): // enumcover: Color"
        );
    }

    #[test]
    fn test_collecting_sink_sorts() {
        let sink = CollectingSink::new();
        sink.report(Diagnostic::dot_import("b.rs", SourceSpan::new(1, 0, 1, 1)));
        sink.report(Diagnostic::dot_import("a.rs", SourceSpan::new(9, 0, 9, 1)));
        sink.report(Diagnostic::dot_import("a.rs", SourceSpan::new(2, 0, 2, 1)));
        assert_eq!(sink.len(), 3);

        let sorted = sink.into_sorted();
        let order: Vec<_> = sorted
            .iter()
            .map(|d| (d.file.display().to_string(), d.span.line))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a.rs".to_string(), 2),
                ("a.rs".to_string(), 9),
                ("b.rs".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&DiagnosticKind::UnhandledConst).unwrap();
        assert_eq!(json, "\"unhandled_const\"");
        assert_eq!(DiagnosticKind::NoConstants.as_str(), "no_constants");
    }
}
