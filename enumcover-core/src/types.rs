//! Core data model shared by the pipeline stages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Globally unique identity of a type: canonical module path plus local name.
///
/// `crate::shapes::Kind` and `crate::draw::Kind` are distinct. Primitive
/// types are identified by their bare name (`u8`, `str`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeIdentity(String);

impl TypeIdentity {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Build an identity from canonical path segments.
    pub fn from_segments(segments: &[String]) -> Self {
        Self(segments.join("::"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The local type name (last path segment).
    pub fn local_name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }

    /// The canonical path of the defining module, if the identity is qualified.
    pub fn module_path(&self) -> Option<&str> {
        self.0.rsplit_once("::").map(|(module, _)| module)
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A source location range. Lines are 1-based, columns 0-based (in chars).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl SourceSpan {
    pub fn new(line: usize, column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            line,
            column,
            end_line,
            end_column,
        }
    }
}

/// How a constant declaration obtains its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstInit {
    /// A literal (or a newtype constructor around one), already unquoted.
    Literal(String),
    /// Copies the value of the constant at this canonical path.
    Alias(String),
    /// Any other expression, kept as source text.
    Opaque(String),
}

/// A named constant as declared by the host, before alias resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstDecl {
    /// Local name (`RED`)
    pub name: String,
    /// Canonical path of the constant (`crate::colors::RED`)
    pub path: String,
    /// Declared type
    pub owner: TypeIdentity,
    pub init: ConstInit,
    /// Source file
    pub file: PathBuf,
    /// Declaration line (1-based)
    pub line: usize,
}

/// A named constant with its resolved underlying value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedConstant {
    pub name: String,
    pub value: String,
    pub owner: TypeIdentity,
    pub path: String,
    /// Module the constant is declared in.
    pub module: String,
    pub file: PathBuf,
    pub line: usize,
}

impl fmt::Display for NamedConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_identity_parts() {
        let ty = TypeIdentity::new("crate::shapes::Kind");
        assert_eq!(ty.local_name(), "Kind");
        assert_eq!(ty.module_path(), Some("crate::shapes"));

        let prim = TypeIdentity::new("u8");
        assert_eq!(prim.local_name(), "u8");
        assert_eq!(prim.module_path(), None);
    }

    #[test]
    fn test_type_identity_from_segments() {
        let segs = vec!["crate".to_string(), "a".to_string(), "Color".to_string()];
        assert_eq!(TypeIdentity::from_segments(&segs).as_str(), "crate::a::Color");
    }

    #[test]
    fn test_named_constant_display() {
        let c = NamedConstant {
            name: "BLUE".to_string(),
            value: "b".to_string(),
            owner: TypeIdentity::new("crate::Color"),
            path: "crate::BLUE".to_string(),
            module: "crate".to_string(),
            file: PathBuf::from("src/lib.rs"),
            line: 3,
        };
        assert_eq!(c.to_string(), "BLUE (b)");
    }
}
